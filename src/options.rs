//! Identicon configuration.
//!
//! `Options` is a plain value: callers start from `Options::default()` and
//! override what they need.  Nothing here is global, so any number of
//! configurations can be used side by side.

use crate::{
    color::Rgba,
    error::{IdenticonError, Result},
    grid::GridSize,
    siphash::{self, Key},
};

pub const DEFAULT_KEY: Key = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];
pub const DEFAULT_GRID_SIZE: i32 = 7;
pub const DEFAULT_SQUARE_SIZE: i32 = 50;
pub const DEFAULT_BORDER_SIZE: i32 = 35;
pub const DEFAULT_BACKGROUND: Rgba = Rgba::rgb(0xff, 0x98, 0x00);
pub const DEFAULT_FOREGROUND: Rgba = Rgba::rgb(0xe6, 0x51, 0x00);

/// Largest accepted image side, in pixels.  The RGBA buffer for it is 1 GiB.
pub const MAX_IMAGE_SIZE: u32 = 16384;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// SipHash key.  Must be at least 16 bytes; only the first 16 are used.
    /// Varying it per application keeps identicons for the same title
    /// distinct across applications.
    pub key: Vec<u8>,

    /// Rows and columns in the identicon, 4 to 9.
    pub grid_size: i32,

    /// Side length in pixels of each grid cell.
    pub square_size: i32,

    /// Empty margin in pixels around the grid.
    pub border_size: i32,

    pub background: Rgba,
    pub foreground: Rgba,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_vec(),
            grid_size: DEFAULT_GRID_SIZE,
            square_size: DEFAULT_SQUARE_SIZE,
            border_size: DEFAULT_BORDER_SIZE,
            background: DEFAULT_BACKGROUND,
            foreground: DEFAULT_FOREGROUND,
        }
    }
}

impl Options {
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_grid_size(mut self, grid_size: i32) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_square_size(mut self, square_size: i32) -> Self {
        self.square_size = square_size;
        self
    }

    pub fn with_border_size(mut self, border_size: i32) -> Self {
        self.border_size = border_size;
        self
    }

    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    pub fn with_foreground(mut self, color: Rgba) -> Self {
        self.foreground = color;
        self
    }

    /// Checks every option, in order: key, grid size, border size, square
    /// size.  The first failure is returned.
    pub fn validate(&self) -> Result<Layout> {
        let key = siphash::key_from_slice(&self.key)?;
        let grid_size = GridSize::new(self.grid_size)?;
        let border_size = dimension("border size", self.border_size)?;
        let square_size = dimension("square size", self.square_size)?;

        let image_size = square_size
            .checked_mul(grid_size.get() as u32)
            .and_then(|grid_px| border_size.checked_mul(2)?.checked_add(grid_px))
            .filter(|&side| side <= MAX_IMAGE_SIZE && rgba_len(side).is_some())
            .ok_or(IdenticonError::InvalidDimension {
                name: "image size",
                value: 2 * self.border_size as i64 + self.square_size as i64 * self.grid_size as i64,
            })?;

        Ok(Layout {
            key,
            grid_size,
            square_size,
            border_size,
            image_size,
            background: self.background,
            foreground: self.foreground,
        })
    }
}

/// Byte length of the RGBA buffer for a square image, if addressable.
fn rgba_len(side: u32) -> Option<usize> {
    let len = (side as u64).checked_mul(side as u64)?.checked_mul(4)?;
    usize::try_from(len).ok()
}

/// Decodes a key given as hex digits, two per byte.
pub fn parse_hex_key(hex: &str) -> Result<Vec<u8>> {
    let invalid = || IdenticonError::InvalidKeyHex(hex.to_string());
    if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..(i + 2)], 16).map_err(|_| invalid()))
        .collect()
}

fn dimension(name: &'static str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| IdenticonError::InvalidDimension {
        name,
        value: value as i64,
    })
}

/// Validated options, ready for hashing and rasterizing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Layout {
    pub key: Key,
    pub grid_size: GridSize,
    pub square_size: u32,
    pub border_size: u32,

    /// Side length in pixels of the (square) image.
    pub image_size: u32,

    pub background: Rgba,
    pub foreground: Rgba,
}
