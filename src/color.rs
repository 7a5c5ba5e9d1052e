use crate::error::{IdenticonError, Result};

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Parses `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
    pub fn from_hex(text: &str) -> Result<Self> {
        let invalid = || IdenticonError::InvalidColor(text.to_string());

        let hex = text.strip_prefix('#').unwrap_or(text);
        if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut channels = [255u8; 4];
        for (i, channel) in channels.iter_mut().take(hex.len() / 2).enumerate() {
            *channel = u8::from_str_radix(&hex[(i * 2)..(i * 2 + 2)], 16).map_err(|_| invalid())?;
        }

        Ok(Self(channels))
    }
}
