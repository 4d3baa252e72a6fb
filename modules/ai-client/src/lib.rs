pub mod gemini;
pub mod imageapi;
pub mod traits;
pub mod util;

pub use traits::{ImageSynth, TextModel};
