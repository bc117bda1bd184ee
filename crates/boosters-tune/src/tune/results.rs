//! Grid search results: one record per combination, sorted by a log column.

use std::cmp::Ordering;
use std::io;

use serde_json::{Map, Number, Value};

use crate::cv::{EvalLogRow, LogColumn};
use crate::param::{ParamSet, ParamValue};

/// Marker for unavailable cells in CSV and Markdown output.
pub const UNAVAILABLE: &str = "NA";

// =============================================================================
// ResultRecord
// =============================================================================

/// Outcome of cross-validating one combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Position of the combination in the input.
    pub index: usize,
    /// The combination as given, without base parameters.
    pub params: ParamSet,
    /// Seed used for fold assignment.
    pub seed: u64,
    /// Log row at the best iteration, `None` when unavailable.
    pub metrics: Option<EvalLogRow>,
    /// Why the metrics are unavailable.
    pub error: Option<String>,
}

impl ResultRecord {
    pub fn is_available(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn value(&self, column: LogColumn) -> Option<f64> {
        self.metrics.map(|row| row.get(column))
    }
}

// =============================================================================
// ResultsTable
// =============================================================================

/// Records of one grid search, sorted by the configured column.
///
/// Available records come first, ordered by the sort column (ties keep
/// input order); records with unavailable metrics follow in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsTable {
    metric: String,
    param_names: Vec<String>,
    records: Vec<ResultRecord>,
    sort_by: LogColumn,
    descending: bool,
    complete: bool,
}

impl ResultsTable {
    /// Sort `records` and build the table.
    pub fn new(
        metric: impl Into<String>,
        mut records: Vec<ResultRecord>,
        sort_by: LogColumn,
        descending: bool,
        complete: bool,
    ) -> Self {
        records.sort_by(|a, b| compare(a, b, sort_by, descending));

        let mut param_names: Vec<String> = Vec::new();
        let mut by_index: Vec<&ResultRecord> = records.iter().collect();
        by_index.sort_by_key(|r| r.index);
        for record in by_index {
            for name in record.params.names() {
                if !param_names.iter().any(|n| n == name) {
                    param_names.push(name.to_string());
                }
            }
        }

        Self {
            metric: metric.into(),
            param_names,
            records,
            sort_by,
            descending,
            complete,
        }
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The top record, if any combination produced metrics.
    pub fn best(&self) -> Option<&ResultRecord> {
        self.records.first().filter(|r| r.is_available())
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Parameter names in first-appearance order over the input.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Header row: parameter names, then the evaluation-log columns.
    ///
    /// Log columns use the metric's own name (`test_rmse_mean`, not
    /// `test_metric_mean`). The generic spelling is still accepted as a sort
    /// key, see [`LogColumn::parse`].
    pub fn columns(&self) -> Vec<String> {
        self.param_names
            .iter()
            .cloned()
            .chain(LogColumn::ALL.iter().map(|c| c.name(&self.metric)))
            .collect()
    }

    pub fn sort_column(&self) -> LogColumn {
        self.sort_by
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    /// `false` when the run was cancelled before every combination started.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.columns())?;
        for record in &self.records {
            out.write_record(self.cells(record, |v| v.to_string()))?;
        }
        out.flush()?;
        Ok(())
    }

    /// JSON array with one object per record, keys in column order.
    ///
    /// Unavailable metrics are `null`; each object also carries `error`.
    pub fn to_json(&self) -> Value {
        let rows = self
            .records
            .iter()
            .map(|record| {
                let mut object = Map::new();
                for name in &self.param_names {
                    let value = record.params.get(name).map_or(Value::Null, param_to_json);
                    object.insert(name.clone(), value);
                }
                for column in LogColumn::ALL {
                    let value = match (column, record.metrics) {
                        (LogColumn::Iteration, Some(row)) => Value::from(row.iteration),
                        (_, Some(row)) => Value::from(row.get(column)),
                        (_, None) => Value::Null,
                    };
                    object.insert(column.name(&self.metric), value);
                }
                let error = record.error.clone().map_or(Value::Null, Value::String);
                object.insert("error".to_string(), error);
                Value::Object(object)
            })
            .collect();
        Value::Array(rows)
    }

    /// GitHub-flavoured Markdown table, metrics with six decimals.
    pub fn to_markdown(&self) -> String {
        let columns = self.columns();
        let mut out = String::new();
        out.push_str(&format!("| {} |\n", columns.join(" | ")));
        out.push_str(&format!("|{}\n", "---|".repeat(columns.len())));
        for record in &self.records {
            let cells = self.cells(record, |v| format!("{v:.6}"));
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }

    fn cells(&self, record: &ResultRecord, fmt_metric: impl Fn(f64) -> String) -> Vec<String> {
        let params = self
            .param_names
            .iter()
            .map(|name| record.params.get(name).map(ToString::to_string).unwrap_or_default());
        let metrics = LogColumn::ALL.into_iter().map(|column| match (column, record.metrics) {
            (LogColumn::Iteration, Some(row)) => row.iteration.to_string(),
            (_, Some(row)) => fmt_metric(row.get(column)),
            (_, None) => UNAVAILABLE.to_string(),
        });
        params.chain(metrics).collect()
    }
}

fn compare(a: &ResultRecord, b: &ResultRecord, column: LogColumn, descending: bool) -> Ordering {
    match (a.value(column), b.value(column)) {
        (Some(x), Some(y)) => {
            let ord = x.total_cmp(&y);
            if descending { ord.reverse() } else { ord }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn param_to_json(value: &ParamValue) -> Value {
    match value {
        ParamValue::Bool(v) => Value::Bool(*v),
        ParamValue::Int(v) => Value::from(*v),
        ParamValue::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
        ParamValue::Str(v) => Value::String(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, eta: f64, test_mean: Option<f64>) -> ResultRecord {
        ResultRecord {
            index,
            params: ParamSet::new().with("eta", eta),
            seed: 42,
            metrics: test_mean.map(|m| EvalLogRow {
                iteration: 10 + index,
                train_mean: m / 2.0,
                train_std: 0.01,
                test_mean: m,
                test_std: 0.02,
            }),
            error: test_mean.is_none().then(|| "failed".to_string()),
        }
    }

    fn table(descending: bool) -> ResultsTable {
        let records = vec![
            record(0, 0.3, Some(2.0)),
            record(1, 0.2, None),
            record(2, 0.1, Some(1.0)),
            record(3, 0.05, Some(2.0)),
        ];
        ResultsTable::new("rmse", records, LogColumn::TestMean, descending, true)
    }

    fn order(table: &ResultsTable) -> Vec<usize> {
        table.records().iter().map(|r| r.index).collect()
    }

    #[test]
    fn ascending_with_unavailable_last_and_stable_ties() {
        let t = table(false);
        assert_eq!(order(&t), [2, 0, 3, 1]);
        assert_eq!(t.best().unwrap().index, 2);
    }

    #[test]
    fn descending_keeps_unavailable_last() {
        assert_eq!(order(&table(true)), [0, 3, 2, 1]);
    }

    #[test]
    fn best_is_none_when_nothing_available() {
        let t = ResultsTable::new("rmse", vec![record(0, 0.1, None)], LogColumn::TestMean, false, true);
        assert!(t.best().is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn columns_are_params_then_log() {
        let records = vec![
            ResultRecord {
                params: ParamSet::new().with("max_depth", 3).with("eta", 0.1),
                ..record(0, 0.1, Some(1.0))
            },
            ResultRecord {
                params: ParamSet::new().with("gamma", 1.0),
                ..record(1, 0.1, Some(0.5))
            },
        ];
        let t = ResultsTable::new("mae", records, LogColumn::TestMean, false, true);
        assert_eq!(
            t.columns(),
            [
                "max_depth",
                "eta",
                "gamma",
                "iteration",
                "train_mae_mean",
                "train_mae_std",
                "test_mae_mean",
                "test_mae_std"
            ]
        );
    }

    #[test]
    fn headers_use_metric_name_but_generic_keys_still_parse() {
        let t = ResultsTable::new("rmse", vec![record(0, 0.1, Some(1.0))], LogColumn::TestMean, false, true);
        let columns = t.columns();
        for (generic, column) in [
            ("train_metric_mean", LogColumn::TrainMean),
            ("train_metric_std", LogColumn::TrainStd),
            ("test_metric_mean", LogColumn::TestMean),
            ("test_metric_std", LogColumn::TestStd),
        ] {
            assert!(!columns.iter().any(|c| c == generic));
            let specific = column.name("rmse");
            assert!(specific.contains("rmse"));
            assert!(columns.contains(&specific));
            assert_eq!(LogColumn::parse(generic, "rmse"), Some(column));
        }
    }

    #[test]
    fn csv_marks_unavailable() {
        let mut buf = Vec::new();
        table(false).write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "eta,iteration,train_rmse_mean,train_rmse_std,test_rmse_mean,test_rmse_std");
        assert_eq!(lines[1], "0.1,12,0.5,0.01,1,0.02");
        assert_eq!(lines[4], "0.2,NA,NA,NA,NA,NA");
    }

    #[test]
    fn json_uses_null() {
        let json = table(false).to_json();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["eta"], 0.1);
        assert_eq!(rows[0]["iteration"], 12);
        assert!(rows[0]["error"].is_null());
        assert!(rows[3]["test_rmse_mean"].is_null());
        assert_eq!(rows[3]["error"], "failed");

        let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "eta");
        assert_eq!(keys[1], "iteration");
    }

    #[test]
    fn markdown_layout() {
        let md = table(false).to_markdown();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[0],
            "| eta | iteration | train_rmse_mean | train_rmse_std | test_rmse_mean | test_rmse_std |"
        );
        assert_eq!(lines[1], "|---|---|---|---|---|---|");
        assert_eq!(lines[2], "| 0.1 | 12 | 0.500000 | 0.010000 | 1.000000 | 0.020000 |");
        assert_eq!(lines[5], "| 0.2 | NA | NA | NA | NA | NA |");
    }
}
