use rimlight_core::{FrameGeometry, RimlightError, SamplerError};

use crate::average::box_average;
use crate::sequence::SampleSequence;

// MARK: - EdgeRun

/// One traversal phase: anchors start at `(x0, y0)` and advance by
/// `(dx, dy)` for `steps` steps. Exactly one of `dx`/`dy` is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeRun {
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
    steps: usize,
}

impl EdgeRun {
    fn anchor(&self, step: usize) -> (i64, i64) {
        (self.x0 + self.dx * step as i64, self.y0 + self.dy * step as i64)
    }
}

/// Steps of a descending run `start, start−d, …` down to 0 inclusive,
/// where `start = len − d`. Empty when the box is wider than the edge.
fn descending_steps(len: u32, depth: u32) -> usize {
    if len < depth {
        0
    } else {
        ((len - depth) / depth) as usize + 1
    }
}

/// Steps of an ascending run `0, d, 2d, …` strictly below `len`.
fn ascending_steps(len: u32, depth: u32) -> usize {
    len.div_ceil(depth) as usize
}

// MARK: - PerimeterSampler

/// Reduces a frame to its clockwise ring of box-averaged border colors.
///
/// The four edge phases are a fixed table, so sample order and count depend
/// only on `(width, height, depth)` — never on frame content. Corner boxes of
/// adjacent edges overlap on purpose: each phase samples at its own fixed
/// edge coordinate, which is what bisecting the border into `depth`-wide
/// stripes looks like at the corners.
#[derive(Debug, Clone)]
pub struct PerimeterSampler {
    geometry: FrameGeometry,
    depth: u32,
    runs: [EdgeRun; 4],
    sample_count: usize,
}

impl PerimeterSampler {
    /// Build the traversal table for a frame geometry and box depth.
    ///
    /// Fails only for empty geometries or `depth == 0`; a depth larger than a
    /// frame dimension is allowed and degenerates some phases to zero or one
    /// step.
    pub fn new(geometry: FrameGeometry, depth: u32) -> Result<Self, RimlightError> {
        if geometry.width == 0 || geometry.height == 0 {
            return Err(RimlightError::ConfigurationInvalid {
                reason: format!("frame geometry {geometry} is empty"),
            });
        }
        if depth == 0 {
            return Err(RimlightError::ConfigurationInvalid {
                reason: "sampling depth must be at least 1".to_owned(),
            });
        }

        let w = geometry.width as i64;
        let h = geometry.height as i64;
        let d = depth as i64;

        // Clockwise from the bottom-right corner.
        let runs = [
            // 1. Bottom edge, right → left.
            EdgeRun {
                x0: w - d,
                y0: h - d,
                dx: -d,
                dy: 0,
                steps: descending_steps(geometry.width, depth),
            },
            // 2. Left edge, bottom → top.
            EdgeRun {
                x0: 0,
                y0: h - d,
                dx: 0,
                dy: -d,
                steps: descending_steps(geometry.height, depth),
            },
            // 3. Top edge, left → right.
            EdgeRun {
                x0: 0,
                y0: 0,
                dx: d,
                dy: 0,
                steps: ascending_steps(geometry.width, depth),
            },
            // 4. Right edge, top → bottom.
            EdgeRun {
                x0: w - d,
                y0: 0,
                dx: 0,
                dy: d,
                steps: ascending_steps(geometry.height, depth),
            },
        ];
        let sample_count = runs.iter().map(|r| r.steps).sum();

        Ok(Self { geometry, depth, runs, sample_count })
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of samples per frame. Constant for the sampler's lifetime;
    /// equals `2 × (width/depth + height/depth)` when both dimensions divide
    /// evenly by `depth`.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Box anchors in traversal order. Exposed for order verification;
    /// `sample_into` visits exactly these, in this order.
    pub fn anchors(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.runs
            .iter()
            .flat_map(|run| (0..run.steps).map(move |i| run.anchor(i)))
    }

    /// Sample one frame into a reused sequence, overwriting every slot.
    ///
    /// `frame` must be exactly `geometry.byte_len()` bytes of RGB24; anything
    /// else is a frame-source contract breach and is rejected before any
    /// pixel is read. `out` is resized on first use and left at
    /// [`sample_count`](Self::sample_count) thereafter.
    pub fn sample_into(
        &self,
        frame: &[u8],
        out: &mut SampleSequence,
    ) -> Result<(), SamplerError> {
        let expected = self.geometry.byte_len();
        if frame.len() != expected {
            return Err(SamplerError::FrameSizeMismatch { expected, actual: frame.len() });
        }

        if out.len() != self.sample_count {
            *out = SampleSequence::new(self.sample_count);
        }

        let slots = out.as_mut_slice();
        let mut index = 0;
        for run in &self.runs {
            for step in 0..run.steps {
                let (x, y) = run.anchor(step);
                slots[index] = box_average(frame, self.geometry, x, y, self.depth);
                index += 1;
            }
        }
        Ok(())
    }

    /// Allocating convenience wrapper around [`sample_into`](Self::sample_into).
    pub fn sample(&self, frame: &[u8]) -> Result<SampleSequence, SamplerError> {
        let mut out = SampleSequence::new(self.sample_count);
        self.sample_into(frame, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rimlight_core::Rgb;

    fn sampler(w: u32, h: u32, d: u32) -> PerimeterSampler {
        PerimeterSampler::new(FrameGeometry::new(w, h), d).expect("valid sampler")
    }

    fn uniform_frame(geometry: FrameGeometry, color: Rgb) -> Vec<u8> {
        let mut frame = Vec::with_capacity(geometry.byte_len());
        for _ in 0..geometry.pixel_count() {
            frame.extend_from_slice(&[color.r, color.g, color.b]);
        }
        frame
    }

    fn set_pixel(frame: &mut [u8], width: u32, x: u32, y: u32, color: Rgb) {
        let offset = (y as usize * width as usize + x as usize) * 3;
        frame[offset] = color.r;
        frame[offset + 1] = color.g;
        frame[offset + 2] = color.b;
    }

    #[test]
    fn sample_count_matches_closed_form_for_divisible_geometries() {
        for (w, h, d) in [(256, 144, 2), (4, 4, 2), (12, 8, 4), (6, 6, 1)] {
            let s = sampler(w, h, d);
            assert_eq!(
                s.sample_count(),
                (2 * (w / d + h / d)) as usize,
                "geometry {w}×{h} depth {d}"
            );
        }
    }

    #[test]
    fn default_capture_geometry_yields_400_samples() {
        assert_eq!(sampler(256, 144, 2).sample_count(), 400);
    }

    #[test]
    fn anchors_trace_4x4_depth_2_clockwise_from_bottom_right() {
        let s = sampler(4, 4, 2);
        let anchors: Vec<_> = s.anchors().collect();
        assert_eq!(anchors.len(), 8);
        // Phase 1: bottom edge, y fixed at h − d.
        assert_eq!(&anchors[0..2], &[(2, 2), (0, 2)]);
        // Phase 2: left edge, x fixed at 0.
        assert_eq!(&anchors[2..4], &[(0, 2), (0, 0)]);
        // Phase 3: top edge, y fixed at 0.
        assert_eq!(&anchors[4..6], &[(0, 0), (2, 0)]);
        // Phase 4: right edge, x fixed at w − d.
        assert_eq!(&anchors[6..8], &[(2, 0), (2, 2)]);
    }

    #[test]
    fn uniform_frame_samples_uniformly() {
        let s = sampler(16, 12, 2);
        let color = Rgb::new(7, 99, 201);
        let frame = uniform_frame(s.geometry(), color);

        let seq = s.sample(&frame).expect("sample");
        assert_eq!(seq.len(), s.sample_count());
        assert!(seq.iter().all(|sample| *sample == color));
    }

    #[test]
    fn first_sample_is_the_bottom_right_box() {
        let s = sampler(8, 8, 2);
        let mut frame = uniform_frame(s.geometry(), Rgb::BLACK);
        // Paint only the bottom-right 2×2 box.
        for (x, y) in [(6, 6), (7, 6), (6, 7), (7, 7)] {
            set_pixel(&mut frame, 8, x, y, Rgb::new(200, 100, 50));
        }

        let seq = s.sample(&frame).expect("sample");
        assert_eq!(seq[0], Rgb::new(200, 100, 50));
        // The same box is revisited as the final right-edge step.
        assert_eq!(seq[seq.len() - 1], Rgb::new(200, 100, 50));
        // Interior-only pixels never contribute: everything else is black.
        assert!(seq.iter().skip(1).take(seq.len() - 2).all(|s| *s == Rgb::BLACK));
    }

    #[test]
    fn corner_boxes_are_shared_not_deduplicated() {
        let s = sampler(4, 4, 2);
        let mut frame = uniform_frame(s.geometry(), Rgb::BLACK);
        // Paint the bottom-left 2×2 box; it ends phase 1 and starts phase 2.
        for (x, y) in [(0, 2), (1, 2), (0, 3), (1, 3)] {
            set_pixel(&mut frame, 4, x, y, Rgb::new(10, 20, 30));
        }

        let seq = s.sample(&frame).expect("sample");
        assert_eq!(seq[1], Rgb::new(10, 20, 30));
        assert_eq!(seq[2], Rgb::new(10, 20, 30));
    }

    #[test]
    fn repeated_sampling_is_bit_identical() {
        let s = sampler(16, 12, 2);
        let mut frame = uniform_frame(s.geometry(), Rgb::new(1, 2, 3));
        set_pixel(&mut frame, 16, 0, 0, Rgb::new(255, 0, 128));

        let first = s.sample(&frame).expect("first pass");
        let second = s.sample(&frame).expect("second pass");
        assert_eq!(first, second);
    }

    #[test]
    fn order_is_independent_of_frame_content() {
        let s = sampler(8, 6, 2);
        let dark = uniform_frame(s.geometry(), Rgb::BLACK);
        let bright = uniform_frame(s.geometry(), Rgb::new(255, 255, 255));

        // Anchors come from the geometry table alone.
        let before: Vec<_> = s.anchors().collect();
        s.sample(&dark).expect("dark");
        s.sample(&bright).expect("bright");
        let after: Vec<_> = s.anchors().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn non_divisible_geometry_writes_every_slot() {
        // 5×5 at depth 2: descending runs take 2 steps (x = 3, 1), ascending
        // runs take 3 (x = 0, 2, 4) — 10 samples, all overwritten.
        let s = sampler(5, 5, 2);
        assert_eq!(s.sample_count(), 10);

        let frame = uniform_frame(s.geometry(), Rgb::new(50, 60, 70));
        let mut seq = SampleSequence::new(s.sample_count());
        s.sample_into(&frame, &mut seq).expect("sample");
        assert!(seq.iter().all(|sample| *sample == Rgb::new(50, 60, 70)));
    }

    #[test]
    fn oversized_depth_degenerates_without_error() {
        // depth wider than the frame: descending runs vanish, ascending runs
        // keep a single (clipped) step each.
        let s = sampler(4, 4, 8);
        let anchors: Vec<_> = s.anchors().collect();
        assert_eq!(anchors, vec![(0, 0), (-4, 0)]);

        let frame = uniform_frame(s.geometry(), Rgb::new(90, 90, 90));
        let seq = s.sample(&frame).expect("sample");
        assert_eq!(seq.len(), 2);
        // Both boxes clip to in-bounds pixels of the uniform frame.
        assert!(seq.iter().all(|sample| *sample == Rgb::new(90, 90, 90)));
    }

    #[test]
    fn mismatched_frame_length_is_rejected() {
        let s = sampler(4, 4, 2);
        let short = vec![0u8; 47];

        let err = s.sample(&short).expect_err("length mismatch");
        assert_eq!(err, SamplerError::FrameSizeMismatch { expected: 48, actual: 47 });
    }

    #[test]
    fn sample_into_reuses_the_buffer() {
        let s = sampler(4, 4, 2);
        let frame = uniform_frame(s.geometry(), Rgb::new(5, 5, 5));

        let mut seq = SampleSequence::new(0);
        s.sample_into(&frame, &mut seq).expect("first");
        assert_eq!(seq.len(), 8);
        s.sample_into(&frame, &mut seq).expect("second");
        assert_eq!(seq.len(), 8);
    }

    #[test]
    fn zero_depth_and_empty_geometry_are_rejected() {
        assert!(PerimeterSampler::new(FrameGeometry::new(4, 4), 0).is_err());
        assert!(PerimeterSampler::new(FrameGeometry::new(0, 4), 2).is_err());
        assert!(PerimeterSampler::new(FrameGeometry::new(4, 0), 2).is_err());
    }
}
