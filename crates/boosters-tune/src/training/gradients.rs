//! Structure-of-Arrays gradient buffer.
//!
//! Gradients and hessians live in separate contiguous arrays so the split
//! finder can gather them by row index without touching the other half.

/// Gradient/hessian buffer for single-output objectives.
///
/// # Example
///
/// ```
/// use boosters_tune::training::Gradients;
///
/// let mut buffer = Gradients::new(100);
/// buffer.set(0, -0.5, 1.0);
///
/// assert_eq!(buffer.get(0), (-0.5, 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Gradients {
    /// Gradient values (∂L/∂pred).
    grads: Vec<f32>,
    /// Hessian values (∂²L/∂pred²).
    hess: Vec<f32>,
}

impl Gradients {
    /// Zero-initialized buffer for `n_samples` rows.
    pub fn new(n_samples: usize) -> Self {
        Self {
            grads: vec![0.0; n_samples],
            hess: vec![0.0; n_samples],
        }
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.grads.len()
    }

    #[inline]
    pub fn get(&self, sample: usize) -> (f32, f32) {
        (self.grads[sample], self.hess[sample])
    }

    #[inline]
    pub fn set(&mut self, sample: usize, grad: f32, hess: f32) {
        self.grads[sample] = grad;
        self.hess[sample] = hess;
    }

    #[inline]
    pub fn grads(&self) -> &[f32] {
        &self.grads
    }

    #[inline]
    pub fn hess(&self) -> &[f32] {
        &self.hess
    }

    /// Mutable gradient and hessian slices, for objectives.
    #[inline]
    pub fn as_mut_slices(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.grads, &mut self.hess)
    }

    /// Sum of gradients and hessians over the given rows, in f64.
    pub fn sum(&self, rows: &[u32]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &r| {
            let r = r as usize;
            (g + self.grads[r] as f64, h + self.hess[r] as f64)
        })
    }
}
