//! Early stopping callback for training.
//!
//! Monitors a validation metric and stops training when no improvement is seen
//! for a specified number of rounds.

/// Outcome of feeding one round's metric to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopAction {
    /// The value is a new best.
    Improved,
    /// No improvement, but still within patience.
    Continue,
    /// Patience exhausted.
    Stop,
}

/// Early stopping configuration and state.
///
/// The best round is tracked even when stopping is disabled (`patience == 0`),
/// so callers can always report the most favorable round.
///
/// # Example
///
/// ```
/// use boosters_tune::training::{EarlyStopAction, EarlyStopping};
///
/// // Monitor a metric where lower is better (e.g., RMSE)
/// let mut early_stop = EarlyStopping::new(2, false);
///
/// assert_eq!(early_stop.update(0.5), EarlyStopAction::Improved);
/// assert_eq!(early_stop.update(0.6), EarlyStopAction::Continue);
/// assert_eq!(early_stop.update(0.7), EarlyStopAction::Continue);
/// assert_eq!(early_stop.update(0.8), EarlyStopAction::Stop);
/// assert_eq!(early_stop.best_round(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Number of rounds without improvement before stopping. `0` disables.
    patience: usize,
    /// Best metric value seen so far.
    best_value: Option<f64>,
    /// Round at which best value was observed.
    best_round: usize,
    /// Current round.
    current_round: usize,
    /// Whether higher metric values are better.
    higher_is_better: bool,
}

impl EarlyStopping {
    /// Create a new early stopping callback.
    ///
    /// # Arguments
    ///
    /// * `patience` - Number of rounds without improvement before stopping
    /// * `higher_is_better` - Whether higher metric values indicate improvement
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
            higher_is_better,
        }
    }

    /// Whether this callback can ever return [`EarlyStopAction::Stop`].
    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Feed the metric value for the current round.
    ///
    /// NaN never counts as an improvement.
    pub fn update(&mut self, value: f64) -> EarlyStopAction {
        let is_improvement = !value.is_nan()
            && match self.best_value {
                None => true,
                Some(best) if self.higher_is_better => value > best,
                Some(best) => value < best,
            };

        if is_improvement {
            self.best_value = Some(value);
            self.best_round = self.current_round;
        }

        self.current_round += 1;

        if is_improvement {
            EarlyStopAction::Improved
        } else if self.is_enabled() && self.current_round - self.best_round > self.patience {
            EarlyStopAction::Stop
        } else {
            EarlyStopAction::Continue
        }
    }

    /// Get the best metric value observed.
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Get the round (0-based) at which the best value was observed.
    pub fn best_round(&self) -> usize {
        self.best_round
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_stopping_no_stop_while_improving() {
        let mut early_stop = EarlyStopping::new(3, false);

        for value in [1.0, 0.9, 0.8, 0.7, 0.6] {
            assert_eq!(early_stop.update(value), EarlyStopAction::Improved);
        }

        assert_eq!(early_stop.best_round(), 4);
        assert!((early_stop.best_value().unwrap() - 0.6).abs() < 1e-10);
    }

    #[test]
    fn early_stopping_stops_after_patience() {
        let mut early_stop = EarlyStopping::new(3, false);

        assert_ne!(early_stop.update(0.5), EarlyStopAction::Stop); // current=1, best=0
        assert_ne!(early_stop.update(0.6), EarlyStopAction::Stop); // 2-0=2 > 3? NO
        assert_ne!(early_stop.update(0.7), EarlyStopAction::Stop); // 3-0=3 > 3? NO
        assert_eq!(early_stop.update(0.8), EarlyStopAction::Stop); // 4-0=4 > 3? YES

        assert_eq!(early_stop.best_round(), 0);
    }

    #[test]
    fn early_stopping_resets_on_improvement() {
        let mut early_stop = EarlyStopping::new(3, false);

        assert_ne!(early_stop.update(1.0), EarlyStopAction::Stop);
        assert_ne!(early_stop.update(1.1), EarlyStopAction::Stop);
        assert_ne!(early_stop.update(1.2), EarlyStopAction::Stop);

        // New improvement resets counter
        assert_eq!(early_stop.update(0.9), EarlyStopAction::Improved);
        assert_ne!(early_stop.update(1.0), EarlyStopAction::Stop);
        assert_ne!(early_stop.update(1.1), EarlyStopAction::Stop);
        assert_eq!(early_stop.update(1.2), EarlyStopAction::Stop);

        assert_eq!(early_stop.best_round(), 3);
    }

    #[test]
    fn early_stopping_higher_is_better() {
        let mut early_stop = EarlyStopping::new(2, true);

        assert_ne!(early_stop.update(0.8), EarlyStopAction::Stop);
        assert_ne!(early_stop.update(0.9), EarlyStopAction::Stop);
        assert_ne!(early_stop.update(0.85), EarlyStopAction::Stop);
        assert_eq!(early_stop.update(0.85), EarlyStopAction::Stop);

        assert_eq!(early_stop.best_round(), 1);
        assert!((early_stop.best_value().unwrap() - 0.9).abs() < 1e-10);
    }

    #[test]
    fn disabled_never_stops_but_tracks_best() {
        let mut early_stop = EarlyStopping::new(0, false);
        assert!(!early_stop.is_enabled());

        early_stop.update(0.3);
        for _ in 0..50 {
            assert_ne!(early_stop.update(1.0), EarlyStopAction::Stop);
        }
        assert_eq!(early_stop.best_round(), 0);
    }

    #[test]
    fn nan_is_never_an_improvement() {
        let mut early_stop = EarlyStopping::new(1, false);
        assert_eq!(early_stop.update(f64::NAN), EarlyStopAction::Continue);
        assert_eq!(early_stop.best_value(), None);
        assert_eq!(early_stop.update(f64::NAN), EarlyStopAction::Stop);
    }
}
