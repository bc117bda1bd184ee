//! Training progress logging.
//!
//! [`TrainingLogger`] emits `tracing` events gated by a [`Verbosity`] level, so
//! the subscriber decides where they go and the trainer decides how chatty it is.

use std::time::Instant;

use super::eval::MetricValue;

/// How much a trainer reports while it runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Nothing.
    Silent,
    /// Warnings only.
    #[default]
    Warning,
    /// Start, finish, and early stopping.
    Info,
    /// Every round's metrics.
    Debug,
}

impl Verbosity {
    /// Map a `-v` count from the command line.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Warning,
            1 => Verbosity::Info,
            _ => Verbosity::Debug,
        }
    }
}

/// Logger for a single training run.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
    n_rounds: usize,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
            n_rounds: 0,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn start_training(&mut self, n_rounds: usize) {
        self.started = Some(Instant::now());
        self.n_rounds = n_rounds;
        if self.verbosity >= Verbosity::Info {
            tracing::info!(n_rounds, "training started");
        }
    }

    pub fn log_metrics(&self, round: usize, metrics: &[MetricValue]) {
        if self.verbosity < Verbosity::Debug || metrics.is_empty() {
            return;
        }
        let line = metrics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("  ");
        tracing::debug!(round, total = self.n_rounds, "{line}");
    }

    pub fn log_early_stopping(&self, round: usize, best_round: usize, metric: &str) {
        if self.verbosity >= Verbosity::Info {
            tracing::info!(round, best_round, metric, "early stopping");
        }
    }

    pub fn finish_training(&mut self) {
        if let Some(started) = self.started.take() {
            if self.verbosity >= Verbosity::Info {
                tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "training finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_is_ordered() {
        assert!(Verbosity::Silent < Verbosity::Warning);
        assert!(Verbosity::Info < Verbosity::Debug);
        assert_eq!(Verbosity::default(), Verbosity::Warning);
    }

    #[test]
    fn verbosity_from_count() {
        assert_eq!(Verbosity::from_count(0), Verbosity::Warning);
        assert_eq!(Verbosity::from_count(1), Verbosity::Info);
        assert_eq!(Verbosity::from_count(5), Verbosity::Debug);
    }

    #[test]
    fn logger_lifecycle_without_subscriber() {
        let mut logger = TrainingLogger::new(Verbosity::Debug);
        logger.start_training(3);
        logger.log_metrics(0, &[MetricValue::new("train-rmse", 0.5, false)]);
        logger.log_early_stopping(2, 0, "rmse");
        logger.finish_training();
        assert_eq!(logger.verbosity(), Verbosity::Debug);
    }
}
