//! Per-iteration evaluation log of one cross-validation run.

use serde::Serialize;

/// Fold-aggregated metrics after one boosting round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalLogRow {
    /// 1-based round number.
    pub iteration: usize,
    pub train_mean: f64,
    pub train_std: f64,
    pub test_mean: f64,
    pub test_std: f64,
}

impl EvalLogRow {
    /// Aggregate per-fold metrics: mean and population standard deviation.
    pub fn from_folds(iteration: usize, train: &[f64], test: &[f64]) -> Self {
        let (train_mean, train_std) = mean_std(train);
        let (test_mean, test_std) = mean_std(test);
        Self {
            iteration,
            train_mean,
            train_std,
            test_mean,
            test_std,
        }
    }

    pub fn get(&self, column: LogColumn) -> f64 {
        match column {
            LogColumn::Iteration => self.iteration as f64,
            LogColumn::TrainMean => self.train_mean,
            LogColumn::TrainStd => self.train_std,
            LogColumn::TestMean => self.test_mean,
            LogColumn::TestStd => self.test_std,
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.train_mean, self.train_std, self.test_mean, self.test_std]
            .iter()
            .all(|v| v.is_finite())
    }
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

// =============================================================================
// LogColumn
// =============================================================================

/// A column of the evaluation log.
///
/// Column names embed the metric (`train_rmse_mean`); the generic spelling
/// (`train_metric_mean`) is accepted wherever a column is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogColumn {
    Iteration,
    TrainMean,
    TrainStd,
    TestMean,
    TestStd,
}

impl LogColumn {
    /// Output order.
    pub const ALL: [LogColumn; 5] = [
        LogColumn::Iteration,
        LogColumn::TrainMean,
        LogColumn::TrainStd,
        LogColumn::TestMean,
        LogColumn::TestStd,
    ];

    /// Column header for a metric, e.g. `test_rmse_std`.
    pub fn name(self, metric: &str) -> String {
        match self {
            LogColumn::Iteration => "iteration".to_string(),
            LogColumn::TrainMean => format!("train_{metric}_mean"),
            LogColumn::TrainStd => format!("train_{metric}_std"),
            LogColumn::TestMean => format!("test_{metric}_mean"),
            LogColumn::TestStd => format!("test_{metric}_std"),
        }
    }

    /// Parse a column header, accepting `metric` as a stand-in for the metric name.
    ///
    /// ```
    /// use boosters_tune::cv::LogColumn;
    ///
    /// assert_eq!(LogColumn::parse("test_metric_mean", "rmse"), Some(LogColumn::TestMean));
    /// assert_eq!(LogColumn::parse("test_rmse_mean", "rmse"), Some(LogColumn::TestMean));
    /// assert_eq!(LogColumn::parse("test_mae_mean", "rmse"), None);
    /// ```
    pub fn parse(name: &str, metric: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name(metric) == name || c.name("metric") == name)
    }
}

// =============================================================================
// CvResult
// =============================================================================

/// Evaluation log plus the round the collaborator picked as best.
#[derive(Debug, Clone, PartialEq)]
pub struct CvResult {
    /// Metric name, used in column headers.
    pub metric: String,
    /// One row per completed round.
    pub log: Vec<EvalLogRow>,
    /// 1-based index into `log`, `None` if no round qualified.
    pub best_iteration: Option<usize>,
}

impl CvResult {
    /// The log row at `best_iteration`, if any.
    pub fn best_row(&self) -> Option<&EvalLogRow> {
        let iteration = self.best_iteration?;
        self.log.get(iteration.checked_sub(1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn population_std() {
        let row = EvalLogRow::from_folds(3, &[1.0, 3.0], &[2.0, 2.0, 2.0, 6.0]);
        assert_eq!(row.iteration, 3);
        assert_abs_diff_eq!(row.train_mean, 2.0);
        assert_abs_diff_eq!(row.train_std, 1.0);
        assert_abs_diff_eq!(row.test_mean, 3.0);
        assert_abs_diff_eq!(row.test_std, 3.0f64.sqrt(), epsilon = 1e-12);
        assert!(row.is_finite());
    }

    #[test]
    fn column_names_embed_metric() {
        let names: Vec<String> = LogColumn::ALL.iter().map(|c| c.name("rmse")).collect();
        assert_eq!(
            names,
            ["iteration", "train_rmse_mean", "train_rmse_std", "test_rmse_mean", "test_rmse_std"]
        );
        assert_eq!(LogColumn::parse("iteration", "rmse"), Some(LogColumn::Iteration));
        assert_eq!(LogColumn::parse("eta", "rmse"), None);
    }

    #[test]
    fn best_row_is_one_based() {
        let log: Vec<EvalLogRow> = (1..=3)
            .map(|i| EvalLogRow::from_folds(i, &[i as f64], &[i as f64]))
            .collect();
        let mut result = CvResult {
            metric: "rmse".into(),
            log,
            best_iteration: Some(2),
        };
        assert_eq!(result.best_row().unwrap().iteration, 2);

        result.best_iteration = Some(0);
        assert!(result.best_row().is_none());
        result.best_iteration = None;
        assert!(result.best_row().is_none());
    }
}
