use std::borrow::Cow;

use super::features::Frame;

/// Splits a sample buffer into overlapping fixed-length frames.
///
/// Frames start every `hop_length` samples for as long as a whole frame
/// fits; a trailing partial frame is dropped. A non-empty buffer shorter
/// than one frame still yields a single frame, zero-padded to full length.
#[derive(Clone, Copy, Debug)]
pub struct FrameSegmenter {
    frame_length: usize,
    hop_length: usize,
}

impl FrameSegmenter {
    pub fn new(frame_length: usize, hop_length: usize) -> Self {
        Self {
            frame_length,
            hop_length,
        }
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn frames(&self, total_samples: usize) -> Vec<Frame> {
        if total_samples == 0 || self.frame_length == 0 || self.hop_length == 0 {
            return Vec::new();
        }

        if total_samples < self.frame_length {
            return vec![Frame {
                index: 0,
                start: 0,
                length: self.frame_length,
            }];
        }

        let count = (total_samples - self.frame_length) / self.hop_length + 1;
        (0..count)
            .map(|index| Frame {
                index,
                start: index * self.hop_length,
                length: self.frame_length,
            })
            .collect()
    }

    /// Samples covered by `frame`, padded with zeros past the end of the buffer.
    pub fn samples<'a>(&self, samples: &'a [f32], frame: &Frame) -> Cow<'a, [f32]> {
        let end = frame.start + frame.length;
        if end <= samples.len() {
            return Cow::Borrowed(&samples[frame.start..end]);
        }

        let mut padded = vec![0.0f32; frame.length];
        let available = samples.len().saturating_sub(frame.start);
        padded[..available].copy_from_slice(&samples[frame.start..frame.start + available]);
        Cow::Owned(padded)
    }
}
