//! Turning titles into identicon images.
//!
//! This is the boundary layer: options are validated here, once, before the
//! hash and grid mapping run.  The rest is rasterizing the grid into RGBA
//! pixels and encoding them.

use std::{
    fs::File,
    io::{BufRead, Write},
    path::Path,
};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::{debug, info};

use crate::{
    error::{IdenticonError, Result},
    grid::Grid,
    options::{Layout, Options},
    siphash,
};

/// A title's hashed and mapped identicon, not yet rasterized.
#[derive(Debug, Clone)]
pub struct Identicon {
    pub digest: u64,
    pub grid: Grid,
    pub layout: Layout,
}

impl Identicon {
    pub fn new(title: &[u8], options: &Options) -> Result<Self> {
        let layout = options.validate()?;
        let digest = siphash::digest(&layout.key, title);
        let grid = Grid::from_digest(digest, layout.grid_size);

        debug!(
            "identicon for {} byte title: digest {:016x}, {} of {} cells filled",
            title.len(),
            digest,
            grid.filled_count(),
            grid.size() * grid.size(),
        );

        Ok(Self {
            digest,
            grid,
            layout,
        })
    }

    /// Rasterizes into a row-major RGBA buffer of `image_size` squared
    /// pixels.
    pub fn to_rgba(&self) -> Vec<u8> {
        let side = self.layout.image_size as usize;
        let square = self.layout.square_size as usize;
        let border = self.layout.border_size as usize;

        let mut pixels = self.layout.background.0.repeat(side * side);

        let fg = self.layout.foreground.0;
        for (row, cells) in self.grid.rows().enumerate() {
            for (col, &filled) in cells.iter().enumerate() {
                if !filled {
                    continue;
                }
                let x = border + col * square;
                let y = border + row * square;
                for py in y..(y + square) {
                    let start = (py * side + x) * 4;
                    for px in pixels[start..(start + square * 4)].chunks_exact_mut(4) {
                        px.copy_from_slice(&fg);
                    }
                }
            }
        }

        pixels
    }

    pub fn write_png<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        png_encode_mini::write_rgba_from_u8(
            writer,
            &self.to_rgba(),
            self.layout.image_size,
            self.layout.image_size,
        )
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut blob = Vec::new();
        self.write_png(&mut blob)?;
        Ok(blob)
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(BASE64.encode(self.to_png()?))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        self.write_png(&mut file)?;
        file.flush()?;
        info!("wrote identicon to {}", path.as_ref().display());
        Ok(())
    }
}

/// Creates an identicon PNG for `title` and returns the encoded bytes.
pub fn create(title: &[u8], options: &Options) -> Result<Vec<u8>> {
    Identicon::new(title, options)?.to_png()
}

/// Like `create()`, but base64-encoded.
pub fn create_base64(title: &[u8], options: &Options) -> Result<String> {
    Identicon::new(title, options)?.to_base64()
}

/// Creates an identicon PNG for `title` and writes it to `path`.
pub fn create_and_save<P: AsRef<Path>>(title: &[u8], path: P, options: &Options) -> Result<()> {
    Identicon::new(title, options)?.save(path)
}

/// Reads a single line to use as a title, without its line terminator.
/// Fails with `InvalidMessage` if the reader is already at end of input.
pub fn read_title<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Err(IdenticonError::InvalidMessage);
    }

    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }

    Ok(line)
}
