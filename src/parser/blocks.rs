use std::io::prelude::*;

use crate::error::{FormatError, GifError, Result};

const MAX_SUB_BLOCK_SIZE: usize = 255;

/// Byte-level access to a GIF stream: little-endian fields and the
/// length-prefixed data sub-blocks that follow extensions and image data.
pub struct BlockReader<'a, T: Read> {
    inner: &'a mut T,
    block: [u8; MAX_SUB_BLOCK_SIZE],
}

impl<'a, T: Read> BlockReader<'a, T> {
    pub fn new(inner: &'a mut T) -> Self {
        Self {
            inner,
            block: [0; MAX_SUB_BLOCK_SIZE],
        }
    }

    pub fn read_byte(&mut self, context: &'static str) -> Result<u8> {
        let mut buffer: [u8; 1] = [0; 1];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|err| GifError::from_io(err, context))?;
        Ok(buffer[0])
    }

    pub fn read_u16(&mut self, context: &'static str) -> Result<u16> {
        // multi-byte numeric fields are ordered with the least significant byte first
        let mut buffer: [u8; 2] = [0; 2];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|err| GifError::from_io(err, context))?;
        Ok(u16::from_le_bytes(buffer))
    }

    pub fn read_bytes(&mut self, count: usize, context: &'static str) -> Result<Box<[u8]>> {
        let mut buffer = vec![0; count];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|err| GifError::from_io(err, context))?;
        Ok(buffer.into_boxed_slice())
    }

    /// Reads one sub-block. An empty slice is the block terminator that ends
    /// a run of sub-blocks.
    pub fn read_block(&mut self) -> Result<&[u8]> {
        let block_size = self.read_byte("sub-block size")? as usize;

        let mut filled = 0;
        while filled < block_size {
            match self.inner.read(&mut self.block[filled..block_size]) {
                Ok(0) => {
                    return Err(FormatError::TruncatedBlock {
                        expected: block_size,
                        actual: filled,
                    }
                    .into())
                }
                Ok(count) => filled += count,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
                Err(err) => return Err(GifError::from_io(err, "sub-block data")),
            }
        }

        Ok(&self.block[..block_size])
    }

    /// Discards sub-blocks up to and including the terminator.
    pub fn skip_sub_blocks(&mut self) -> Result<()> {
        while !self.read_block()?.is_empty() {}
        Ok(())
    }

    /// Concatenates every sub-block up to the terminator.
    pub fn read_data_sub_blocks(&mut self) -> Result<Vec<u8>> {
        let mut result = Vec::new();

        loop {
            let block = self.read_block()?;
            if block.is_empty() {
                break Ok(result);
            }
            result.extend_from_slice(block);
        }
    }
}
