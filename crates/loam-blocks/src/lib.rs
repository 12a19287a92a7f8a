//! Voxel identifiers and the base color palette.
#![forbid(unsafe_code)]

pub mod palette;
pub mod types;

pub use palette::{Palette, PaletteConfig, Rgb};
pub use types::{HOTBAR, Voxel};
