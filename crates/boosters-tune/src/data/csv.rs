//! CSV loading.
//!
//! The first row is a header. One column (chosen by name) holds the target,
//! every other column becomes a numeric feature. Empty cells and `NA`/`NaN`
//! are read as missing feature values; a missing target is an error.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ndarray::{Array1, Array2};

use super::dataset::{Dataset, DatasetError};

/// Load a dataset from a CSV file.
pub fn load_csv(path: impl AsRef<Path>, target_column: &str) -> Result<Dataset, DatasetError> {
    let file = File::open(path.as_ref())?;
    read_csv(BufReader::new(file), target_column)
}

/// Read a dataset from any CSV source.
///
/// # Example
///
/// ```
/// use boosters_tune::data::read_csv;
///
/// let csv = "x,y\n1.0,2.0\n2.0,4.0\nNA,6.0\n";
/// let ds = read_csv(csv.as_bytes(), "y").unwrap();
/// assert_eq!(ds.n_samples(), 3);
/// assert_eq!(ds.feature_names(), ["x"]);
/// assert!(ds.get(2, 0).is_nan());
/// ```
pub fn read_csv<R: Read>(reader: R, target_column: &str) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let target_idx = headers
        .iter()
        .position(|h| h == target_column)
        .ok_or_else(|| DatasetError::MissingTarget(target_column.to_string()))?;

    let feature_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != target_idx)
        .map(|(_, h)| h.to_string())
        .collect();
    let n_features = feature_names.len();

    // Sample-major while reading; transposed once at the end.
    let mut values: Vec<f32> = Vec::new();
    let mut targets: Vec<f32> = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, cell) in record.iter().enumerate() {
            let value = parse_cell(cell).ok_or_else(|| DatasetError::Parse {
                row: row + 1,
                column: headers.get(col).unwrap_or_default().to_string(),
                value: cell.to_string(),
            })?;
            if col == target_idx {
                if !value.is_finite() {
                    return Err(DatasetError::MissingTargetValue { row: row + 1 });
                }
                targets.push(value);
            } else {
                values.push(value);
            }
        }
    }

    let n_samples = targets.len();
    let n_values = values.len();
    let samples = Array2::from_shape_vec((n_samples, n_features), values).map_err(|_| {
        DatasetError::ShapeMismatch {
            expected: n_samples * n_features,
            got: n_values,
            field: "features",
        }
    })?;

    Dataset::from_rows(samples.view(), Array1::from(targets).view())?.with_feature_names(feature_names)
}

fn parse_cell(cell: &str) -> Option<f32> {
    match cell {
        "" | "NA" | "na" | "NaN" | "nan" | "?" => Some(f32::NAN),
        other => other.parse::<f32>().ok(),
    }
}
