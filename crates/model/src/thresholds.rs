//! Z-score threshold bank.

use crate::ModelError;

/// Default two-sided z thresholds (90%, 95%, 99%, 99.73%).
pub const DEFAULT_THRESHOLDS: [f64; 4] = [1.645, 1.96, 2.575, 3.0];

/// Ascending set of positive z thresholds tested together.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBank {
    thresholds: Vec<f64>,
}

impl ThresholdBank {
    /// Create a bank from arbitrary thresholds; they are sorted and deduplicated.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if the bank is empty or holds a
    /// non-positive or non-finite threshold.
    pub fn new(mut thresholds: Vec<f64>) -> Result<Self, ModelError> {
        if thresholds.is_empty() {
            return Err(ModelError::InvalidConfig("empty threshold bank".to_string()));
        }
        if let Some(bad) = thresholds.iter().find(|t| !t.is_finite() || **t <= 0.0) {
            return Err(ModelError::InvalidConfig(format!("threshold {bad} must be positive")));
        }
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        Ok(Self { thresholds })
    }

    /// Thresholds in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.thresholds
    }

    /// Number of thresholds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Check if empty. Never true for a constructed bank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Column labels, one per threshold.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.thresholds.iter().map(ToString::to_string).collect()
    }
}

impl Default for ThresholdBank {
    fn default() -> Self {
        Self { thresholds: DEFAULT_THRESHOLDS.to_vec() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bank() {
        let bank = ThresholdBank::default();
        assert_eq!(bank.as_slice(), &DEFAULT_THRESHOLDS);
        assert_eq!(bank.labels(), vec!["1.645", "1.96", "2.575", "3"]);
    }

    #[test]
    fn bank_is_sorted_and_validated() {
        let bank = ThresholdBank::new(vec![3.0, 1.96, 3.0]).unwrap();
        assert_eq!(bank.as_slice(), &[1.96, 3.0]);

        assert!(ThresholdBank::new(Vec::new()).is_err());
        assert!(ThresholdBank::new(vec![-1.0]).is_err());
        assert!(ThresholdBank::new(vec![f64::NAN]).is_err());
    }
}
