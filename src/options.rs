use std::time::Duration;

use crate::error::FormatError;

/// Knobs for a single decode. The defaults match what animation playback in
/// the game expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Used for frames whose graphic control delay is zero or missing.
    pub default_delay: Duration,
    /// Lower bound for every non-zero delay.
    pub min_delay: Duration,
    /// Stop after this many frames as if the trailer had been reached.
    pub max_frames: Option<usize>,
    /// Largest pixel count accepted for the logical screen or a single image.
    pub max_image_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            default_delay: Duration::from_millis(100),
            min_delay: Duration::from_millis(10),
            max_frames: None,
            max_image_size: 1 << 25,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn with_max_image_size(mut self, max_image_size: usize) -> Self {
        self.max_image_size = max_image_size;
        self
    }

    /// Rejects dimensions whose pixel count is past `max_image_size`.
    pub(crate) fn check_image_size(&self, width: u16, height: u16) -> Result<(), FormatError> {
        if width as usize * height as usize > self.max_image_size {
            return Err(FormatError::ImageTooLarge {
                width,
                height,
                limit: self.max_image_size,
            });
        }

        Ok(())
    }

    /// Converts a delay in hundredths of a second into playback time.
    pub fn normalize_delay(&self, delay_cs: u16) -> Duration {
        if delay_cs == 0 {
            return self.default_delay;
        }

        Duration::from_millis(u64::from(delay_cs) * 10).max(self.min_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_uses_default() {
        let options = DecodeOptions::default();
        assert_eq!(options.normalize_delay(0), Duration::from_millis(100));
    }

    #[test]
    fn nonzero_delay_is_floored() {
        let options = DecodeOptions::default().with_min_delay(Duration::from_millis(50));
        assert_eq!(options.normalize_delay(1), Duration::from_millis(50));
        assert_eq!(options.normalize_delay(7), Duration::from_millis(70));
    }

    #[test]
    fn image_size_limit() {
        let options = DecodeOptions::default().with_max_image_size(100);
        assert_eq!(options.check_image_size(10, 10), Ok(()));
        assert_eq!(
            options.check_image_size(101, 1),
            Err(FormatError::ImageTooLarge {
                width: 101,
                height: 1,
                limit: 100
            })
        );
        assert!(DecodeOptions::default().check_image_size(u16::MAX, u16::MAX).is_err());
    }
}
