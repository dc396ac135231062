//! LibSVM format dataset implementation
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1
//!
//! Rows are densified: missing indices become 0.0 and every vector gets the
//! dataset dimension.

use crate::core::{Dataset, Result, SVMError, Sample, Vector};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Label plus 0-based (index, value) pairs of one line
type SparseRow = (f64, Vec<(usize, f64)>);

/// Dataset implementation for LibSVM format files
#[derive(Debug, Clone)]
pub struct LibSVMDataset {
    samples: Vec<Sample>,
    dimensions: usize,
}

impl LibSVMDataset {
    /// Load a dataset from a LibSVM format file
    ///
    /// The dimension is the largest feature index in the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset whose vectors must have a fixed dimension, such as test
    /// data for an already trained model
    pub fn from_file_with_dim<P: AsRef<Path>>(path: P, dimensions: usize) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        Self::from_reader_with_dim(BufReader::new(file), dimensions)
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let rows = Self::read_rows(reader)?;
        let dimensions = rows
            .iter()
            .flat_map(|(_, features)| features.iter().map(|&(index, _)| index + 1))
            .max()
            .unwrap_or(0);
        Self::densify(rows, dimensions)
    }

    /// Load from a reader with a fixed dimension
    pub fn from_reader_with_dim<R: BufRead>(reader: R, dimensions: usize) -> Result<Self> {
        let rows = Self::read_rows(reader)?;
        Self::densify(rows, dimensions)
    }

    fn read_rows<R: BufRead>(reader: R) -> Result<Vec<SparseRow>> {
        let mut rows = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SVMError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let row = Self::parse_line(line).map_err(|e| {
                SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        Ok(rows)
    }

    fn densify(rows: Vec<SparseRow>, dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(SVMError::InvalidDataset(
                "No features found".to_string(),
            ));
        }

        let mut samples = Vec::with_capacity(rows.len());
        for (label, features) in rows {
            let mut dense = vec![0.0; dimensions];
            for (index, value) in features {
                if index >= dimensions {
                    return Err(SVMError::DimensionMismatch {
                        expected: dimensions,
                        actual: index + 1,
                    });
                }
                dense[index] = value;
            }
            samples.push(Sample::new(Vector::new(dense), label));
        }

        Ok(LibSVMDataset {
            samples,
            dimensions,
        })
    }

    /// Parse a single line in libsvm format
    fn parse_line(line: &str) -> Result<SparseRow> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.is_empty() {
            return Err(SVMError::ParseError("Empty line".to_string()));
        }

        // Parse label
        let label = parts[0]
            .parse::<f64>()
            .map_err(|_| SVMError::ParseError(format!("Invalid label: {}", parts[0])))?;

        // Map to ±1 by sign
        let label = if label > 0.0 { 1.0 } else { -1.0 };

        // Parse feature:value pairs
        let mut features = Vec::with_capacity(parts.len() - 1);

        for feature_str in &parts[1..] {
            let (index, value) = feature_str.split_once(':').ok_or_else(|| {
                SVMError::ParseError(format!("Invalid feature format: {}", feature_str))
            })?;

            let index = index
                .parse::<usize>()
                .map_err(|_| SVMError::ParseError(format!("Invalid feature index: {}", index)))?;

            let value = value
                .parse::<f64>()
                .map_err(|_| SVMError::ParseError(format!("Invalid feature value: {}", value)))?;

            // libsvm uses 1-based indexing, convert to 0-based
            if index == 0 {
                return Err(SVMError::ParseError(format!(
                    "Feature index must be positive: {}",
                    index
                )));
            }

            features.push((index - 1, value));
        }

        Ok((label, features))
    }
}

impl Dataset for LibSVMDataset {
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
    fn test_parse_line_basic() {
        let (label, features) = LibSVMDataset::parse_line("+1 1:0.5 3:1.2").unwrap();

        assert_eq!(label, 1.0);
        assert_eq!(features, vec![(0, 0.5), (2, 1.2)]); // 1-based to 0-based
    }

    #[test]
    fn test_parse_line_label_mapping() {
        // Positive non-unit values should become +1
        let (label, _) = LibSVMDataset::parse_line("2 1:1.0").unwrap();
        assert_eq!(label, 1.0);

        // Negative values and zero become -1
        let (label, _) = LibSVMDataset::parse_line("-3 1:1.0").unwrap();
        assert_eq!(label, -1.0);
        let (label, _) = LibSVMDataset::parse_line("0 1:1.0").unwrap();
        assert_eq!(label, -1.0);
    }

    #[test]
    fn test_parse_line_invalid_format() {
        // Invalid feature format
        assert!(LibSVMDataset::parse_line("+1 1").is_err());

        // Invalid index
        assert!(LibSVMDataset::parse_line("+1 abc:1.0").is_err());

        // Invalid value
        assert!(LibSVMDataset::parse_line("+1 1:abc").is_err());

        // Zero index (libsvm is 1-based)
        assert!(LibSVMDataset::parse_line("+1 0:1.0").is_err());
    }

    #[test]
    fn test_from_reader_densifies() {
        let data = "+1 1:0.5 3:1.2\n-1 2:0.3 5:2.1\n";
        let dataset = LibSVMDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 5);

        let sample1 = dataset.get_sample(0);
        assert_eq!(sample1.label, 1.0);
        assert_eq!(sample1.features.to_vec(), vec![0.5, 0.0, 1.2, 0.0, 0.0]);

        let sample2 = dataset.get_sample(1);
        assert_eq!(sample2.label, -1.0);
        assert_eq!(sample2.features.to_vec(), vec![0.0, 0.3, 0.0, 0.0, 2.1]);
    }

    #[test]
    fn test_from_reader_with_dim() {
        let data = "+1 1:0.5\n-1 2:0.3\n";
        let dataset = LibSVMDataset::from_reader_with_dim(Cursor::new(data), 4).unwrap();
        assert_eq!(dataset.dim(), 4);
        assert_eq!(dataset.get_sample(1).features.rank(), 4);

        let too_wide = "+1 1:0.5 6:1.0\n";
        assert!(matches!(
            LibSVMDataset::from_reader_with_dim(Cursor::new(too_wide), 4),
            Err(SVMError::DimensionMismatch {
                expected: 4,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_from_reader_empty_lines_and_comments() {
        let data = "# Comment line\n+1 1:0.5\n\n# Another comment\n-1 2:0.3\n";
        let dataset = LibSVMDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get_labels(), vec![1.0, -1.0]);
    }

    #[test]
    fn test_from_reader_empty_dataset() {
        let data = "# Only comments\n\n";
        let result = LibSVMDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(SVMError::EmptyDataset)));
    }

    #[test]
    fn test_labels_without_features() {
        let data = "+1\n-1\n";
        let result = LibSVMDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(SVMError::InvalidDataset(_))));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let data = "+1 1:0.5\n-1 x:0.3\n";
        match LibSVMDataset::from_reader(Cursor::new(data)) {
            Err(SVMError::ParseError(msg)) => assert!(msg.contains("line 2")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "+1 1:0.5 3:1.2").expect("Failed to write");
        writeln!(temp_file, "-1 2:0.3 5:2.1").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        let dataset = LibSVMDataset::from_file(temp_file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 5);
        assert_eq!(dataset.get_labels(), vec![1.0, -1.0]);
    }

    #[test]
    fn test_from_file_io_error() {
        let result = LibSVMDataset::from_file("/non/existent/file.libsvm");
        assert!(matches!(result.unwrap_err(), SVMError::IoError(_)));
    }
}
