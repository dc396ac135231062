//! CSV format dataset implementation
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the label
//! - All other columns are features
//! - First row can be headers (automatically detected)

use crate::core::{Dataset, Result, SVMError, Sample, Vector};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for CSV format files
#[derive(Debug, Clone)]
pub struct CSVDataset {
    samples: Vec<Sample>,
    dimensions: usize,
}

impl CSVDataset {
    /// Load a dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader, detecting a header row
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(reader: R, auto_detect_header: bool) -> Result<Self> {
        let mut samples: Vec<Sample> = Vec::new();
        let mut header_checked = !auto_detect_header;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SVMError::IoError)?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Only the first non-comment line may be a header
            if !header_checked {
                header_checked = true;
                if Self::is_header_line(line) {
                    continue;
                }
            }

            let sample = Self::parse_data_line(line).map_err(|e| {
                SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;

            if let Some(first) = samples.first() {
                if first.features.rank() != sample.features.rank() {
                    return Err(SVMError::DimensionMismatch {
                        expected: first.features.rank(),
                        actual: sample.features.rank(),
                    });
                }
            }
            samples.push(sample);
        }

        let dimensions = match samples.first() {
            Some(first) => first.features.rank(),
            None => return Err(SVMError::EmptyDataset),
        };

        Ok(CSVDataset {
            samples,
            dimensions,
        })
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 2 {
            return false;
        }

        // Most feature columns fail to parse as numbers
        let non_numeric_count = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count > fields.len() / 2
    }

    /// Parse a CSV data line into a Sample
    fn parse_data_line(line: &str) -> Result<Sample> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();

        if fields.len() < 2 {
            return Err(SVMError::ParseError(format!(
                "Line has too few fields: {}",
                line
            )));
        }

        // Last field is the label
        let label_str = fields[fields.len() - 1];
        let label = label_str
            .parse::<f64>()
            .map_err(|_| SVMError::ParseError(format!("Invalid label: {}", label_str)))?;
        let label = if label > 0.0 { 1.0 } else { -1.0 };

        let mut values = Vec::with_capacity(fields.len() - 1);
        for (idx, field) in fields.iter().take(fields.len() - 1).enumerate() {
            let value = field.parse::<f64>().map_err(|_| {
                SVMError::ParseError(format!(
                    "Invalid feature value at column {}: {}",
                    idx + 1,
                    field
                ))
            })?;
            values.push(value);
        }

        Ok(Sample::new(Vector::new(values), label))
    }
}

impl Dataset for CSVDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn get_labels(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_csv_basic() {
        let data = "1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 2);

        let sample1 = dataset.get_sample(0);
        assert_eq!(sample1.label, 1.0);
        assert_eq!(sample1.features.to_vec(), vec![1.0, 2.0]);

        let sample2 = dataset.get_sample(1);
        assert_eq!(sample2.label, -1.0);
        assert_eq!(sample2.features.to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_csv_with_headers() {
        let data = "feature1,feature2,label\n1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2); // Headers should be skipped
        assert_eq!(dataset.get_labels(), vec![1.0, -1.0]);
    }

    #[test]
    fn test_csv_header_after_comment() {
        let data = "# exported\nx,y,label\n1.0,2.0,1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_csv_keeps_zero_features() {
        let data = "0.0,0.0,1\n0.0,3.0,-1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.get_sample(0).features.to_vec(), vec![0.0, 0.0]);
        assert_eq!(dataset.get_sample(1).features.to_vec(), vec![0.0, 3.0]);
    }

    #[test]
    fn test_csv_label_conversion() {
        let data = "1.0,2.0,0.5\n3.0,4.0,-0.5\n5.0,6.0,0\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.get_labels(), vec![1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_csv_empty_lines_and_comments() {
        let data = "# Comment\n1.0,2.0,1\n\n3.0,4.0,-1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_csv_invalid_format() {
        // Too few fields
        assert!(CSVDataset::from_reader(Cursor::new("1.0\n")).is_err());

        // Invalid number
        assert!(CSVDataset::from_reader(Cursor::new("1.0,2.0,1\n1.0,abc,-1\n")).is_err());

        // Ragged rows
        assert!(matches!(
            CSVDataset::from_reader(Cursor::new("1.0,2.0,1\n1.0,-1\n")),
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));

        // Nothing but comments
        assert!(matches!(
            CSVDataset::from_reader(Cursor::new("# nothing\n")),
            Err(SVMError::EmptyDataset)
        ));
    }

    #[test]
    fn test_csv_manual_header_control() {
        let data = "1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = CSVDataset::from_reader_with_options(Cursor::new(data), false).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_is_header_line() {
        assert!(CSVDataset::is_header_line("feature1,feature2,label"));
        assert!(CSVDataset::is_header_line("x1,x2,x3,y"));
        assert!(!CSVDataset::is_header_line("1.0,2.0,3.0,1"));
        assert!(!CSVDataset::is_header_line("1")); // Too few fields
    }
}
