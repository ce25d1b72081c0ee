use std::collections::VecDeque;

use crate::render::backend::FrameRGBA;

/// Temporal blend of each captured frame with the previous `frames` captures.
///
/// With `frames == 0` frames pass through untouched.
#[derive(Debug, Default)]
pub(crate) struct MotionBlur {
    frames: u32,
    history: VecDeque<FrameRGBA>,
}

impl MotionBlur {
    pub(crate) fn new(frames: u32) -> Self {
        Self {
            frames,
            history: VecDeque::with_capacity(frames as usize),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.history.clear();
    }

    /// Blend `frame` with the retained history and remember it for later frames.
    pub(crate) fn apply(&mut self, frame: &FrameRGBA) -> FrameRGBA {
        if self.frames == 0 {
            return frame.clone();
        }

        // a size change invalidates the history
        if self
            .history
            .front()
            .is_some_and(|h| h.width != frame.width || h.height != frame.height)
        {
            self.history.clear();
        }

        let out = if self.history.is_empty() {
            frame.clone()
        } else {
            let n = (self.history.len() + 1) as u32;
            let mut sums: Vec<u32> = frame.data.iter().map(|&b| u32::from(b)).collect();
            for past in &self.history {
                for (s, &b) in sums.iter_mut().zip(past.data.iter()) {
                    *s += u32::from(b);
                }
            }
            FrameRGBA {
                width: frame.width,
                height: frame.height,
                data: sums.into_iter().map(|s| ((s + n / 2) / n) as u8).collect(),
                premultiplied: frame.premultiplied,
            }
        };

        if self.history.len() == self.frames as usize {
            self.history.pop_front();
        }
        self.history.push_back(frame.clone());
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/blur.rs"]
mod tests;
