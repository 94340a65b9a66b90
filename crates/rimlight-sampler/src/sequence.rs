use rimlight_core::Rgb;

/// Ordered, fixed-length ring of border samples for one frame.
///
/// Index 0 is the bottom-right corner; indices advance clockwise. The length
/// is fixed by the sampler geometry at construction and never changes, so a
/// single sequence can be reused across frames with
/// [`PerimeterSampler::sample_into`](crate::PerimeterSampler::sample_into).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSequence {
    samples: Vec<Rgb>,
}

impl SampleSequence {
    /// A black-initialized sequence of `len` samples.
    pub fn new(len: usize) -> Self {
        Self { samples: vec![Rgb::BLACK; len] }
    }

    /// A sequence with explicit contents, already in clockwise order.
    pub fn from_samples(samples: Vec<Rgb>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[Rgb] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rgb> {
        self.samples.iter()
    }

    /// Flatten to interleaved `r g b` bytes for streaming to hardware.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len() * 3);
        for s in &self.samples {
            out.extend_from_slice(&[s.r, s.g, s.b]);
        }
        out
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Rgb] {
        &mut self.samples
    }
}

impl std::ops::Index<usize> for SampleSequence {
    type Output = Rgb;

    fn index(&self, index: usize) -> &Rgb {
        &self.samples[index]
    }
}

impl<'a> IntoIterator for &'a SampleSequence {
    type Item = &'a Rgb;
    type IntoIter = std::slice::Iter<'a, Rgb>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sequence_is_black() {
        let seq = SampleSequence::new(4);
        assert_eq!(seq.len(), 4);
        assert!(seq.iter().all(|s| *s == Rgb::BLACK));
    }

    #[test]
    fn rgb_bytes_are_interleaved_in_order() {
        let mut seq = SampleSequence::new(2);
        seq.as_mut_slice()[0] = Rgb::new(1, 2, 3);
        seq.as_mut_slice()[1] = Rgb::new(4, 5, 6);

        assert_eq!(seq.to_rgb_bytes(), vec![1, 2, 3, 4, 5, 6]);
    }
}
