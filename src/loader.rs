use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::debug;

use crate::error::{GifError, Result};
use crate::frame::Animation;
use crate::options::DecodeOptions;

/// Turns a complete GIF file into an animation.
pub trait DecodeGif: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Animation>;
}

/// The built-in LZW decoder.
#[derive(Debug, Clone, Default)]
pub struct NativeDecoder {
    options: DecodeOptions,
}

impl NativeDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }
}

impl DecodeGif for NativeDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Animation> {
        crate::decode_with_options(bytes, &self.options)
    }
}

/// Loads GIF assets from disk with a decoder picked once at startup.
pub struct GifLoader {
    decoder: Box<dyn DecodeGif>,
    root: PathBuf,
}

impl Default for GifLoader {
    fn default() -> Self {
        Self::new(NativeDecoder::default())
    }
}

impl GifLoader {
    pub fn new(decoder: impl DecodeGif + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
            root: PathBuf::new(),
        }
    }

    /// Resolves relative paths against `root` instead of the working directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Animation> {
        let path = self.root.join(path);
        let bytes = fs::read(&path).map_err(|source| GifError::Open {
            path: path.clone(),
            source,
        })?;

        let animation = self.decoder.decode(&bytes)?;
        debug!(
            "loaded {} with {} frames, {:?} in total",
            path.display(),
            animation.len(),
            animation.total_duration()
        );

        Ok(animation)
    }

    /// Loads several assets, stopping at the first one that fails.
    pub fn load_all<P: AsRef<Path>>(&self, paths: &[P]) -> anyhow::Result<Vec<Animation>> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                self.load(path)
                    .with_context(|| format!("failed to load GIF {}", path.display()))
            })
            .collect()
    }
}
