//! 2D rendering
//!
//! Levels describe a frame as a [`DrawList`]; on the web the canvas painter
//! replays it onto a `CanvasRenderingContext2d`.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod color;
pub mod draw;
pub mod sprites;

pub use color::Color;
pub use draw::{DrawCmd, DrawList, GradientDir, TextAlign, TextBaseline, TextStyle};
pub use sprites::{PixelImage, SpriteBank, SpriteKind, SpriteSlot, SpriteSource, procedural_sprite};
