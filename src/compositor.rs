use log::{debug, warn};

use crate::color_table::{ColorTable, Rgb};
use crate::parser::{DisposalMethod, GraphicControl, ImageDescriptor};

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Interlaced images store rows in four passes: every 8th row from 0, every
/// 8th from 4, every 4th from 2, every 2nd from 1. Yields the canvas row of
/// each stored row, in storage order.
pub fn interlaced_rows(height: usize) -> impl Iterator<Item = usize> {
    (0..height)
        .step_by(8)
        .chain((4..height).step_by(8))
        .chain((2..height).step_by(4))
        .chain((1..height).step_by(2))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

/// How the last drawn frame must be cleaned up before the next one.
#[derive(Debug, Clone, Copy)]
struct PendingDisposal {
    method: DisposalMethod,
    rect: Rect,
    // the frame hid the background color behind its transparent index
    background_is_transparent: bool,
}

/// The shared canvas every frame is drawn onto.
#[derive(Debug)]
pub struct Compositor {
    width: usize,
    height: usize,
    canvas: Vec<u8>,
    background: Option<(u8, Rgb)>,
    pending: Option<PendingDisposal>,
    saved: Option<Vec<u8>>,
}

impl Compositor {
    pub fn new(width: u16, height: u16) -> Self {
        let (width, height) = (width as usize, height as usize);

        Self {
            width,
            height,
            canvas: vec![0; width * height * 4],
            background: None,
            pending: None,
            saved: None,
        }
    }

    /// Background index and its global table color.
    pub fn set_background(&mut self, index: u8, color: Option<Rgb>) {
        self.background = color.map(|color| (index, color));
    }

    /// Draws one frame and returns a snapshot of the whole canvas.
    pub fn composite(
        &mut self,
        descriptor: &ImageDescriptor,
        control: &GraphicControl,
        palette: &ColorTable,
        indicies: &[u8],
    ) -> Box<[u8]> {
        self.dispose_previous(control.transparent_index.is_some());

        if control.disposal_method == DisposalMethod::RestoreToPrevious {
            self.saved = Some(self.canvas.clone());
        }

        let rect = Rect {
            left: descriptor.left as usize,
            top: descriptor.top as usize,
            width: descriptor.width as usize,
            height: descriptor.height as usize,
        };

        if rect.left + rect.width > self.width || rect.top + rect.height > self.height {
            warn!(
                "frame at ({}, {}) sized {}x{} exceeds the {}x{} canvas, clipping",
                rect.left, rect.top, rect.width, rect.height, self.width, self.height
            );
        }

        if descriptor.interlace {
            self.draw_rows(rect, interlaced_rows(rect.height), control, palette, indicies);
        } else {
            self.draw_rows(rect, 0..rect.height, control, palette, indicies);
        }

        let background_is_transparent = descriptor.local_color_table.is_none()
            && matches!(
                (self.background, control.transparent_index),
                (Some((background, _)), Some(transparent)) if background == transparent
            );

        self.pending = Some(PendingDisposal {
            method: control.disposal_method,
            rect,
            background_is_transparent,
        });

        self.canvas.clone().into_boxed_slice()
    }

    fn draw_rows(
        &mut self,
        rect: Rect,
        rows: impl Iterator<Item = usize>,
        control: &GraphicControl,
        palette: &ColorTable,
        indicies: &[u8],
    ) {
        // columns past the canvas edge are never visited
        let visible = self.width.saturating_sub(rect.left).min(rect.width);
        if visible == 0 {
            return;
        }

        let mut out_of_range = 0usize;

        for (stored, row) in rows.enumerate() {
            let y = rect.top + row;
            if y >= self.height {
                continue;
            }

            let start = stored * rect.width;
            for column in 0..visible {
                // short lzw data leaves the tail of the image as index 0
                let index = indicies.get(start + column).copied().unwrap_or(0);

                if control.transparent_index == Some(index) {
                    continue;
                }

                let Some(color) = palette.get(index) else {
                    out_of_range += 1;
                    continue;
                };

                let offset = (y * self.width + rect.left + column) * 4;
                self.canvas[offset..offset + 4].copy_from_slice(&color.to_rgba());
            }
        }

        if out_of_range > 0 {
            warn!(
                "{} pixels referenced colors past the {}-entry table, left untouched",
                out_of_range,
                palette.len()
            );
        }
    }

    fn dispose_previous(&mut self, incoming_transparency: bool) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        match pending.method {
            DisposalMethod::None | DisposalMethod::DoNotDispose => {}
            DisposalMethod::RestoreToBackground => {
                let fill = match self.background {
                    Some((_, color))
                        if !incoming_transparency && !pending.background_is_transparent =>
                    {
                        color.to_rgba()
                    }
                    _ => TRANSPARENT,
                };

                debug!("restoring {:?} to background {:?}", pending.rect, fill);
                self.fill(pending.rect, fill);
            }
            DisposalMethod::RestoreToPrevious => match self.saved.take() {
                Some(saved) => self.canvas = saved,
                None => warn!("no saved canvas to restore, keeping the current one"),
            },
        }
    }

    fn fill(&mut self, rect: Rect, color: [u8; 4]) {
        let right = (rect.left + rect.width).min(self.width);
        let bottom = (rect.top + rect.height).min(self.height);
        if rect.left >= right {
            return;
        }

        for y in rect.top..bottom {
            let start = (y * self.width + rect.left) * 4;
            let end = (y * self.width + right) * 4;
            for pixel in self.canvas[start..end].chunks_exact_mut(4) {
                pixel.copy_from_slice(&color);
            }
        }
    }
}
