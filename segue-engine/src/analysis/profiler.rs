//! Streaming RMS energy profiler
//!
//! Consumes decoded interleaved sample blocks and reduces them to one
//! RMS value per fixed-length segment. Blocks may arrive in any size;
//! frames split across block boundaries are reassembled internally.

use crate::analysis::profile::EnergyProfile;
use crate::error::{Error, Result};
use tracing::debug;

/// Accumulates interleaved `f32` samples into an [`EnergyProfile`]
///
/// Multi-channel input is downmixed (channel average) per frame before
/// squaring, so the profile reflects combined energy rather than any
/// single channel.
pub struct EnergyProfiler {
    sample_rate: u32,
    channels: usize,
    frames_per_segment: usize,
    segment_seconds: f64,
    /// Running sum of squared downmixed samples in the open segment
    sum_squares: f64,
    /// Frames accumulated into the open segment so far
    frames_in_segment: usize,
    segments: Vec<f32>,
    /// Samples of an incomplete frame carried between blocks
    pending_frame: Vec<f32>,
}

impl EnergyProfiler {
    /// Create a profiler for one track's stream
    ///
    /// `segment_seconds` is typically 0.5; shorter segments raise
    /// resolution at the cost of noisier boundary detection.
    pub fn new(sample_rate: u32, channels: usize, segment_seconds: f64) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::Analysis("sample rate must be positive".into()));
        }
        if channels == 0 {
            return Err(Error::Analysis("channel count must be positive".into()));
        }
        if segment_seconds <= 0.0 {
            return Err(Error::Analysis(format!(
                "segment length must be positive, got {}",
                segment_seconds
            )));
        }
        let frames_per_segment = ((segment_seconds * sample_rate as f64).round() as usize).max(1);
        Ok(Self {
            sample_rate,
            channels,
            frames_per_segment,
            segment_seconds,
            sum_squares: 0.0,
            frames_in_segment: 0,
            segments: Vec::new(),
            pending_frame: Vec::with_capacity(channels),
        })
    }

    /// Feed one block of interleaved samples
    ///
    /// Block length does not need to align to frame or segment
    /// boundaries.
    pub fn push_block(&mut self, samples: &[f32]) {
        let mut iter = samples.iter().copied();

        // Complete a frame left over from the previous block first
        if !self.pending_frame.is_empty() {
            while self.pending_frame.len() < self.channels {
                match iter.next() {
                    Some(s) => self.pending_frame.push(s),
                    None => return,
                }
            }
            let sum: f32 = self.pending_frame.iter().sum();
            self.accumulate_frame(sum / self.channels as f32);
            self.pending_frame.clear();
        }

        let mut frame_sum = 0.0f32;
        let mut in_frame = 0usize;
        for sample in iter {
            frame_sum += sample;
            in_frame += 1;
            if in_frame == self.channels {
                self.accumulate_frame(frame_sum / self.channels as f32);
                frame_sum = 0.0;
                in_frame = 0;
            }
        }

        // Stash the trailing partial frame for the next block
        if in_frame > 0 {
            let start = samples.len() - in_frame;
            self.pending_frame.extend_from_slice(&samples[start..]);
        }
    }

    fn accumulate_frame(&mut self, downmixed: f32) {
        self.sum_squares += f64::from(downmixed) * f64::from(downmixed);
        self.frames_in_segment += 1;
        if self.frames_in_segment == self.frames_per_segment {
            self.flush_segment();
        }
    }

    fn flush_segment(&mut self) {
        let mean_square = self.sum_squares / self.frames_in_segment as f64;
        self.segments.push(mean_square.sqrt() as f32);
        self.sum_squares = 0.0;
        self.frames_in_segment = 0;
    }

    /// Frames accumulated so far (diagnostics)
    pub fn frames_seen(&self) -> usize {
        self.segments.len() * self.frames_per_segment + self.frames_in_segment
    }

    /// Finish the stream and build the profile
    ///
    /// A partial final segment is flushed with the RMS of the frames it
    /// actually holds; input that ended exactly on a boundary adds
    /// nothing. A dangling partial frame (stream ended mid-frame) is
    /// dropped.
    pub fn finish(mut self) -> EnergyProfile {
        if !self.pending_frame.is_empty() {
            debug!(
                "Dropping {} samples of an incomplete final frame",
                self.pending_frame.len()
            );
        }
        if self.frames_in_segment > 0 {
            self.flush_segment();
        }
        debug!(
            "Energy profile complete: {} segments of {:.2}s at {} Hz",
            self.segments.len(),
            self.segment_seconds,
            self.sample_rate
        );
        EnergyProfile::new(self.segments, self.segment_seconds, self.sample_rate)
    }
}
