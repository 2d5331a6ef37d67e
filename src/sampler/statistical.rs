//! Random row sampling with replacement.
//!
//! Every frame is drawn from its own `StdRng`, seeded from the caller's
//! generator, so frames are sampled independently of one another while the
//! whole run stays reproducible under a seeded caller.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::frame::{total_rows, Frame, FrameSet};

/// Draw `n` rows with replacement. Empty frames yield empty samples.
pub fn sample_rows<R: Rng>(frame: &Frame, n: usize, rng: &mut R) -> Frame {
    if frame.is_empty() {
        return frame.take(&[]);
    }
    let indices: Vec<usize> = (0..n)
        .map(|_| rng.random_range(0..frame.num_rows()))
        .collect();
    frame.take(&indices)
}

/// Draw `round(fraction * rows)` rows with replacement.
pub fn sample_fraction<R: Rng>(frame: &Frame, fraction: f64, rng: &mut R) -> Frame {
    let draws = (fraction * frame.num_rows() as f64).round() as usize;
    sample_rows(frame, draws, rng)
}

/// Sample the same fraction of every frame.
pub fn sample_percentage<R: Rng>(frames: &[Frame], fraction: f64, rng: &mut R) -> FrameSet {
    frames
        .iter()
        .map(|frame| sample_fraction(frame, fraction, &mut frame_rng(rng)))
        .collect()
}

/// Spread `total` rows evenly across frames.
///
/// Each frame gets `floor(total / frames)` rows. When that per-frame quota
/// exceeds the rows of the whole table, the frames are returned unchanged.
pub fn sample_row_count<R: Rng>(frames: &[Frame], total: usize, rng: &mut R) -> FrameSet {
    if frames.is_empty() {
        return FrameSet::new();
    }
    let quota = total / frames.len();
    if quota > total_rows(frames) {
        return frames.to_vec();
    }
    frames
        .iter()
        .map(|frame| sample_rows(frame, quota, &mut frame_rng(rng)))
        .collect()
}

fn frame_rng<R: Rng>(rng: &mut R) -> StdRng {
    StdRng::seed_from_u64(rng.random())
}
