//! GIF87a/89a decoding into fully composited RGBA animation frames.
//!
//! ```no_run
//! let bytes = std::fs::read("fireplace.gif")?;
//! let animation = gif_frames::decode(bytes.as_slice())?;
//! for frame in &animation.frames {
//!     println!("{}x{} for {:?}", frame.width, frame.height, frame.delay);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color_table;
pub mod error;
pub mod frame;
pub mod loader;
pub mod options;

mod compositor;
mod parser;

use std::io::Read;

pub use color_table::{ColorTable, Rgb};
pub use error::{FormatError, GifError, Result};
pub use frame::{Animation, Frame, LoopCount};
pub use loader::{DecodeGif, GifLoader, NativeDecoder};
pub use options::DecodeOptions;
pub use parser::{Decoder, DisposalMethod, LogicalScreenDescriptor};

/// Decodes a whole stream with default options. Any error discards the frames
/// decoded so far; use [`Decoder`] directly to keep them.
pub fn decode<R: Read>(reader: R) -> Result<Animation> {
    decode_with_options(reader, &DecodeOptions::default())
}

pub fn decode_with_options<R: Read>(mut reader: R, options: &DecodeOptions) -> Result<Animation> {
    let mut decoder = Decoder::new(&mut reader).with_options(options.clone());
    decoder.parse()?;
    Ok(decoder.into_animation())
}
