mod bit_reader;
mod blocks;
mod decoder;
mod lzw;

pub use decoder::{Decoder, LogicalScreenDescriptor};
pub(crate) use decoder::{GraphicControl, ImageDescriptor};

/// What happens to a frame's area before the next frame is drawn.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalMethod {
    #[default]
    None = 0,
    DoNotDispose = 1,
    RestoreToBackground = 2,
    RestoreToPrevious = 3,
}

impl DisposalMethod {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DisposalMethod::None),
            1 => Some(DisposalMethod::DoNotDispose),
            2 => Some(DisposalMethod::RestoreToBackground),
            3 => Some(DisposalMethod::RestoreToPrevious),
            _ => None,
        }
    }
}
