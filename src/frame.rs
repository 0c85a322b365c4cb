use std::time::Duration;

/// A full-canvas RGBA snapshot as it should be shown at this point of playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    /// Row-major RGBA, `width * height * 4` bytes.
    pub rgba: Box<[u8]>,
    pub delay: Duration,
}

impl Frame {
    pub fn delay_secs(&self) -> f32 {
        self.delay.as_secs_f32()
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut pixel = [0; 4];
        pixel.copy_from_slice(self.rgba.get(offset..offset + 4)?);
        Some(pixel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    /// No application extension, or a NETSCAPE2.0 count of zero.
    #[default]
    Infinite,
    Number(u16),
}

impl From<u16> for LoopCount {
    fn from(value: u16) -> Self {
        match value {
            0 => LoopCount::Infinite,
            number => LoopCount::Number(number),
        }
    }
}

/// Everything a caller needs to build its own playable animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub width: u16,
    pub height: u16,
    pub frames: Vec<Frame>,
    pub loop_count: LoopCount,
    pub(crate) default_delay: Duration,
}

impl Animation {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(|frame| frame.delay).sum()
    }

    /// Mean frame delay, for playback that uses one duration for every frame.
    pub fn average_frame_duration(&self) -> Duration {
        if self.frames.is_empty() {
            return self.default_delay;
        }

        let count = u32::try_from(self.frames.len()).unwrap_or(u32::MAX);
        self.total_duration() / count
    }
}
