use crate::{
    composition::model::Timing,
    foundation::core::{Fps, FrameIndex},
    foundation::error::{SlidecastError, SlidecastResult},
};

/// What one tick renders: the resolved image pair and, during a transition
/// window, the linear progress through it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlan {
    pub frame: FrameIndex,
    pub image_a: usize,
    pub image_b: usize,
    /// `None` inside the display window (image A alone, opaque).
    pub progress: Option<f64>,
}

/// Fixed-rate virtual clock over the total render duration.
///
/// Frames are strictly sequential: the iterator yields exactly one plan per
/// frame index in `[0, total_frames)`, in increasing order. `total_frames`
/// uses round-to-nearest (`n_images * cycle_ms * fps / 1000`); the terminal
/// check is `current >= total`.
#[derive(Clone, Debug)]
pub struct FrameScheduler {
    image_count: usize,
    timing: Timing,
    fps: Fps,
    current: u64,
    total: u64,
}

impl FrameScheduler {
    pub fn new(image_count: usize, timing: Timing, fps: Fps) -> SlidecastResult<Self> {
        if image_count == 0 {
            return Err(SlidecastError::validation(
                "scheduler requires at least one image",
            ));
        }
        if timing.display_ms == 0 || timing.transition_ms == 0 {
            return Err(SlidecastError::validation(
                "display and transition durations must be > 0",
            ));
        }

        let total_ms = (image_count as u64 * timing.cycle_ms()) as f64;
        let total = (total_ms * fps.as_f64() / 1000.0).round() as u64;
        Ok(Self {
            image_count,
            timing,
            fps,
            current: 0,
            total,
        })
    }

    pub fn total_frames(&self) -> u64 {
        self.total
    }

    pub fn current_frame(&self) -> u64 {
        self.current
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }

    /// Resolve the plan for an arbitrary frame index (pure).
    pub fn plan_at(&self, frame: u64) -> FramePlan {
        let current_time_ms = (frame as f64) * self.fps.frame_interval_ms();
        let cycle_ms = self.timing.cycle_ms() as f64;
        let cycle_index = (current_time_ms / cycle_ms).floor() as u64;
        let time_in_cycle = current_time_ms - (cycle_index as f64) * cycle_ms;

        let image_a = (cycle_index as usize) % self.image_count;
        let image_b = ((cycle_index as usize) + 1) % self.image_count;

        let display_ms = f64::from(self.timing.display_ms);
        let progress = if time_in_cycle < display_ms {
            None
        } else {
            Some((time_in_cycle - display_ms) / f64::from(self.timing.transition_ms))
        };

        FramePlan {
            frame: FrameIndex(frame),
            image_a,
            image_b,
            progress,
        }
    }
}

impl Iterator for FrameScheduler {
    type Item = FramePlan;

    fn next(&mut self) -> Option<FramePlan> {
        if self.current >= self.total {
            return None;
        }
        let plan = self.plan_at(self.current);
        self.current += 1;
        Some(plan)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scheduler.rs"]
mod tests;
