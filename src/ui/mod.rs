//! Terminal-facing helpers: line input and box rendering.

pub mod reader;
pub mod render;

pub use reader::{LineReader, ScriptedReader, TerminalReader};
pub use render::{draw_box, numbered, BOX_WIDTH};
