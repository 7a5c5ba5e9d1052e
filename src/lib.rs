//! Keyed SipHash-2-4 fingerprints rendered as mirrored identicon grids.

pub mod avalanche;
pub mod color;
pub mod error;
pub mod grid;
pub mod options;
pub mod render;
pub mod siphash;

pub use error::{IdenticonError, Result};
pub use grid::{Grid, GridSize};
pub use options::Options;
pub use render::{create, create_and_save, create_base64, Identicon};
