//! Sample element types carried by the output streams.

/// One complex sample of a rotating phasor: in-phase `i = sin(phase)`,
/// quadrature `q = cos(phase)`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct IqSample {
    pub i: f32,
    pub q: f32,
}

impl IqSample {
    #[inline] #[must_use] pub const fn new(i: f32, q: f32) -> Self { Self { i, q } }

    /// Squared magnitude `i² + q²`.
    #[inline]
    #[must_use]
    pub fn norm_sqr(&self) -> f32 {
        self.i * self.i + self.q * self.q
    }
}

impl From<(f32, f32)> for IqSample {
    #[inline]
    fn from((i, q): (f32, f32)) -> Self {
        Self::new(i, q)
    }
}
