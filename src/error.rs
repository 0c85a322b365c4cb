use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GifError>;

#[derive(Error, Debug)]
pub enum GifError {
    #[error("unable to open GIF source {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to read GIF source")]
    Read(#[source] io::Error),

    #[error("malformed GIF stream: {0}")]
    Format(#[from] FormatError),
}

impl GifError {
    pub fn is_format(&self) -> bool {
        matches!(self, GifError::Format(_))
    }

    pub fn is_open(&self) -> bool {
        matches!(self, GifError::Open { .. })
    }

    /// Maps an io error raised while `context` was being read. Running out of
    /// input is a structural problem with the stream, everything else is the
    /// source's fault.
    pub(crate) fn from_io(err: io::Error, context: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::UnexpectedEof { context }.into()
        } else {
            GifError::Read(err)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("signature is invalid")]
    InvalidSignature,

    #[error("stream ended while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("encountered unexpected block label 0x{0:02x}")]
    UnexpectedLabel(u8),

    #[error("image has neither a local nor a global color table")]
    MissingColorTable,

    #[error("image of {width}x{height} pixels exceeds the limit of {limit}")]
    ImageTooLarge { width: u16, height: u16, limit: usize },

    #[error("lzw minimum code size {0} is outside 1..=8")]
    InvalidMinCodeSize(u8),

    #[error("lzw code {code} is past the next free table slot {next}")]
    InvalidCode { code: u16, next: u16 },

    #[error("sub-block announced {expected} bytes but only {actual} were available")]
    TruncatedBlock { expected: usize, actual: usize },
}
