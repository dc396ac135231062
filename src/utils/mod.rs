//! Utility functions for SVM operations

use crate::core::{Dataset, Result, SVMError, Vector};

/// Text renderings of vectors for tab-separated reports
pub mod export {
    use super::*;

    /// `[R]` followed by every component, each terminated by a tab
    pub fn amplitude_line(v: &Vector) -> String {
        let body: String = v.iter().map(|value| format!("{value}\t")).collect();
        format!("[R]\t{body}")
    }

    /// `[Theta]` followed by a `0` per component, each terminated by a tab
    pub fn phase_line(v: &Vector) -> String {
        let mut line = String::from("[Theta]\t");
        for _ in 0..v.rank() {
            line.push_str("0\t");
        }
        line
    }

    /// Components in braces, comma separated: `{1,2.5,-3}`
    pub fn to_json_string(v: &Vector) -> String {
        let body: Vec<String> = v.iter().map(|value| value.to_string()).collect();
        format!("{{{}}}", body.join(","))
    }
}

/// Validation and preprocessing utilities
pub mod validation {
    use super::*;

    /// Validate that all labels in a dataset are binary (-1 or +1)
    pub fn validate_binary_labels<D: Dataset>(dataset: &D) -> Result<()> {
        let labels = dataset.get_labels();
        for (i, &label) in labels.iter().enumerate() {
            if label != 1.0 && label != -1.0 {
                return Err(SVMError::InvalidDataset(format!(
                    "Invalid label {label} at index {i}: labels must be +1 or -1"
                )));
            }
        }
        Ok(())
    }

    /// Count positive and negative labels; the ratio is positive / negative
    pub fn check_label_balance<D: Dataset>(dataset: &D) -> (usize, usize, f64) {
        let labels = dataset.get_labels();
        let positive_count = labels.iter().filter(|&&l| l > 0.0).count();
        let negative_count = labels.len() - positive_count;
        let balance_ratio = if negative_count == 0 {
            f64::INFINITY
        } else {
            positive_count as f64 / negative_count as f64
        };
        (positive_count, negative_count, balance_ratio)
    }
}
