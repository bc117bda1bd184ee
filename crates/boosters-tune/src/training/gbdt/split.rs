//! Gain computation and regularization parameters.

// =============================================================================
// Gain Parameters
// =============================================================================

/// Parameters for split gain computation and leaf weight calculation.
///
/// Defaults follow XGBoost: `lambda = 1`, `alpha = 0`, `gamma = 0`,
/// `min_child_weight = 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct GainParams {
    /// L2 regularization (lambda).
    pub reg_lambda: f32,
    /// L1 regularization (alpha).
    pub reg_alpha: f32,
    /// Minimum split gain (gamma).
    pub min_gain: f32,
    /// Minimum sum of hessians per child.
    pub min_child_weight: f32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
        }
    }
}

impl GainParams {
    /// L1 soft thresholding of a gradient sum.
    #[inline]
    fn soft_threshold(&self, grad_sum: f64) -> f64 {
        let alpha = self.reg_alpha as f64;
        if grad_sum > alpha {
            grad_sum - alpha
        } else if grad_sum < -alpha {
            grad_sum + alpha
        } else {
            0.0
        }
    }

    /// Structure score of a node: `T(G)² / (H + λ)`.
    #[inline]
    fn score(&self, grad_sum: f64, hess_sum: f64) -> f64 {
        let g = self.soft_threshold(grad_sum);
        g * g / (hess_sum + self.reg_lambda as f64)
    }

    /// Compute the split gain using XGBoost formula.
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    ///
    /// Gradient sums are soft-thresholded by α before squaring.
    #[inline]
    pub fn compute_gain(
        &self,
        grad_left: f64,
        hess_left: f64,
        grad_right: f64,
        hess_right: f64,
        grad_parent: f64,
        hess_parent: f64,
    ) -> f64 {
        let gain = self.score(grad_left, hess_left) + self.score(grad_right, hess_right)
            - self.score(grad_parent, hess_parent);
        0.5 * gain - self.min_gain as f64
    }

    /// Both children carry at least `min_child_weight` hessian.
    #[inline]
    pub fn is_valid_split(&self, hess_left: f64, hess_right: f64) -> bool {
        let min_weight = self.min_child_weight as f64;
        hess_left >= min_weight && hess_right >= min_weight
    }

    /// Compute leaf weight with L1 and L2 regularization.
    ///
    /// ```text
    /// weight = -sign(G) × max(0, |G| - α) / (H + λ)
    /// ```
    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        let denom = hess_sum + self.reg_lambda as f64;
        if denom <= 0.0 {
            return 0.0;
        }
        (-self.soft_threshold(grad_sum) / denom) as f32
    }
}

// =============================================================================
// SplitCandidate
// =============================================================================

/// Best split found for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitCandidate {
    pub feature: u32,
    /// Rows with `value < threshold` go left.
    pub threshold: f32,
    /// Direction for missing values.
    pub default_left: bool,
    pub gain: f64,
}

impl SplitCandidate {
    /// Replace `current` when `other` has a strictly larger gain.
    #[inline]
    pub fn keep_better(current: &mut Option<SplitCandidate>, other: SplitCandidate) {
        match current {
            Some(best) if best.gain >= other.gain => {}
            _ => *current = Some(other),
        }
    }
}
