//! Screen-relative transition heights for the baked LOD group.

/// Transition height forced onto the second-to-last output level.
const PENULTIMATE_HEIGHT: f32 = 0.1;

/// Returns one screen-relative transition height per output level.
///
/// Level `i` of `n` gets `1 - (i + 1) / n`; level `n - 2` is then pinned to
/// `0.1`. A single level has no LOD group and gets `0.0`.
pub fn output_transition_heights(level_count: usize) -> Vec<f32> {
    if level_count <= 1 {
        return vec![0.0; level_count];
    }

    let n = level_count as f32;
    let mut heights: Vec<f32> = (0..level_count)
        .map(|i| 1.0 - (i as f32 + 1.0) / n)
        .collect();
    heights[level_count - 2] = PENULTIMATE_HEIGHT;
    heights
}
