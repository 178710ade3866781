//! Immutable labelled dataset shared by every agent.

use crate::core::{ClassIndex, Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::path::Path;

/// Position of the class column inside raw dataset records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ClassColumn {
    /// Label is the first column
    First,
    /// Label is the last column
    Last,
}

impl ClassColumn {
    /// Resolve the class column from a dataset identifier.
    ///
    /// `iris_last.csv` resolves to [`ClassColumn::Last`], `wine_first.csv`
    /// to [`ClassColumn::First`]. Any other suffix is a configuration error.
    pub fn from_dataset_name(name: &str) -> Result<Self> {
        let suffix = name.rsplit('_').next().unwrap_or(name);
        let suffix = suffix.split('.').next().unwrap_or(suffix);

        match suffix {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            _ => Err(Error::UnresolvableClassColumn(name.to_string())),
        }
    }

    fn position(self, width: usize) -> usize {
        match self {
            Self::First => 0,
            Self::Last => width - 1,
        }
    }
}

impl TryFrom<i64> for ClassColumn {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::First),
            -1 => Ok(Self::Last),
            other => Err(format!("class column must be 0 or -1, got {}", other)),
        }
    }
}

impl From<ClassColumn> for i64 {
    fn from(column: ClassColumn) -> Self {
        match column {
            ClassColumn::First => 0,
            ClassColumn::Last => -1,
        }
    }
}

/// Final path component of a dataset path, ignoring a trailing slash.
pub fn dataset_name(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    Path::new(trimmed)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Labelled feature matrix.
///
/// Labels are encoded as positions into the sorted list of distinct raw
/// labels, so probability columns line up across every classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array1<ClassIndex>,
    labels: Vec<f64>,
}

impl Dataset {
    /// Create a dataset from a feature matrix and raw labels.
    pub fn new(x: Array2<f64>, raw_labels: &[f64]) -> Result<Self> {
        if x.nrows() != raw_labels.len() {
            return Err(Error::InvalidDataset(format!(
                "{} rows but {} labels",
                x.nrows(),
                raw_labels.len()
            )));
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(Error::InvalidDataset("dataset is empty".to_string()));
        }
        if let Some(bad) = raw_labels.iter().find(|label| !label.is_finite()) {
            return Err(Error::InvalidDataset(format!("non-finite label {}", bad)));
        }

        let mut labels = raw_labels.to_vec();
        labels.sort_by(f64::total_cmp);
        labels.dedup();

        let y = raw_labels
            .iter()
            .map(|label| {
                labels
                    .binary_search_by(|known| known.total_cmp(label))
                    .unwrap_or_default()
            })
            .collect();

        Ok(Self { x, y, labels })
    }

    /// Split raw numeric records into features and labels.
    pub fn from_records(records: &[Vec<f64>], class_column: ClassColumn) -> Result<Self> {
        let width = records.first().map(Vec::len).unwrap_or(0);
        if width < 2 {
            return Err(Error::InvalidDataset(
                "records need a label and at least one feature".to_string(),
            ));
        }
        if let Some(row) = records.iter().position(|record| record.len() != width) {
            return Err(Error::InvalidDataset(format!(
                "record {} has {} columns, expected {}",
                row,
                records[row].len(),
                width
            )));
        }

        let label_at = class_column.position(width);
        let mut features = Vec::with_capacity(records.len() * (width - 1));
        let mut labels = Vec::with_capacity(records.len());
        for record in records {
            for (col, value) in record.iter().enumerate() {
                if col == label_at {
                    labels.push(*value);
                } else {
                    features.push(*value);
                }
            }
        }

        let x = Array2::from_shape_vec((records.len(), width - 1), features)
            .map_err(|e| Error::InvalidDataset(e.to_string()))?;
        Self::new(x, &labels)
    }

    /// Number of instances.
    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Number of distinct classes.
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    /// Feature matrix.
    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    /// Encoded labels.
    pub fn y(&self) -> ArrayView1<'_, ClassIndex> {
        self.y.view()
    }

    /// Sorted distinct raw labels.
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Display name of an encoded class.
    pub fn label_name(&self, class: ClassIndex) -> String {
        match self.labels.get(class) {
            Some(label) if label.fract() == 0.0 => format!("{}", *label as i64),
            Some(label) => label.to_string(),
            None => class.to_string(),
        }
    }

    /// Copy of the given rows restricted to the given columns.
    pub fn select(&self, rows: &[usize], columns: &[usize]) -> Array2<f64> {
        self.x.select(Axis(0), rows).select(Axis(1), columns)
    }

    /// Labels of the given rows.
    pub fn targets(&self, rows: &[usize]) -> Array1<ClassIndex> {
        self.y.select(Axis(0), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_class_column_from_name() {
        assert_eq!(
            ClassColumn::from_dataset_name("iris_last.csv").unwrap(),
            ClassColumn::Last
        );
        assert_eq!(
            ClassColumn::from_dataset_name("wine_quality_first.csv").unwrap(),
            ClassColumn::First
        );
        assert!(matches!(
            ClassColumn::from_dataset_name("iris.csv"),
            Err(Error::UnresolvableClassColumn(_))
        ));
    }

    #[test]
    fn test_class_column_serde() {
        let column: ClassColumn = serde_json::from_str("-1").unwrap();
        assert_eq!(column, ClassColumn::Last);
        assert_eq!(serde_json::to_string(&ClassColumn::First).unwrap(), "0");
        assert!(serde_json::from_str::<ClassColumn>("3").is_err());
    }

    #[test]
    fn test_dataset_name() {
        assert_eq!(dataset_name("data/iris_last.csv"), "iris_last.csv");
        assert_eq!(dataset_name("data/folder/"), "folder");
    }

    #[test]
    fn test_labels_are_encoded_in_sorted_order() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let dataset = Dataset::new(x, &[5.0, 2.0, 5.0, 9.0]).unwrap();
        assert_eq!(dataset.n_classes(), 3);
        assert_eq!(dataset.y().to_vec(), vec![1, 0, 1, 2]);
        assert_eq!(dataset.label_name(2), "9");
    }

    #[test]
    fn test_from_records_splits_label_column() {
        let records = vec![vec![0.0, 1.5, 2.5], vec![1.0, 3.5, 4.5]];
        let first = Dataset::from_records(&records, ClassColumn::First).unwrap();
        assert_eq!(first.n_features(), 2);
        assert_eq!(first.x()[[1, 0]], 3.5);
        assert_eq!(first.y().to_vec(), vec![0, 1]);

        let last = Dataset::from_records(&records, ClassColumn::Last).unwrap();
        assert_eq!(last.x()[[0, 0]], 0.0);
        assert_eq!(last.labels(), &[2.5, 4.5]);
    }

    #[test]
    fn test_rejects_mismatched_shapes() {
        let x = array![[1.0], [2.0]];
        assert!(matches!(
            Dataset::new(x, &[1.0]),
            Err(Error::InvalidDataset(_))
        ));
        let ragged = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(Dataset::from_records(&ragged, ClassColumn::Last).is_err());
    }

    #[test]
    fn test_select_rows_and_columns() {
        let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let dataset = Dataset::new(x, &[0.0, 1.0, 0.0]).unwrap();
        let view = dataset.select(&[2, 0], &[1, 2]);
        assert_eq!(view, array![[8.0, 9.0], [2.0, 3.0]]);
        assert_eq!(dataset.targets(&[1, 2]).to_vec(), vec![1, 0]);
    }
}
