//! Document model shared by the parser, the renderer and the JSON bindings.

mod cell;
mod document;
mod style;

pub use cell::*;
pub use document::*;
pub use style::*;
