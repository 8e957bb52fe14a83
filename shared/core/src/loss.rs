use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// Mean per-batch losses of one pass over some splits.
///
/// A pass that saw no batches yields `[0.0]` with `has_data() == false`;
/// callers must read that as "no data", not as a perfect loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossVector {
    values: Vec<f64>,
    batches: usize,
}

impl LossVector {
    pub fn new(values: Vec<f64>, batches: usize) -> Self {
        Self { values, batches }
    }

    pub fn no_data() -> Self {
        Self {
            values: vec![0.0],
            batches: 0,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First component, conventionally the total objective.
    pub fn total(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn has_data(&self) -> bool {
        self.batches > 0
    }
}

impl Display for LossVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{value:.6}")?;
        }
        write!(f, "]")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("batch returned {found} losses, but earlier batches in this pass returned {expected}")]
pub struct LossShapeMismatch {
    pub expected: usize,
    pub found: usize,
}

/// Running elementwise sum of per-batch loss vectors for a single pass.
#[derive(Debug, Default)]
pub struct LossAccumulator {
    sum: Option<Vec<f64>>,
    batches: usize,
}

impl LossAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, losses: &[f64]) -> Result<(), LossShapeMismatch> {
        match &mut self.sum {
            None => self.sum = Some(losses.to_vec()),
            Some(sum) => {
                if sum.len() != losses.len() {
                    return Err(LossShapeMismatch {
                        expected: sum.len(),
                        found: losses.len(),
                    });
                }
                for (acc, loss) in sum.iter_mut().zip(losses) {
                    *acc += loss;
                }
            }
        }
        self.batches += 1;
        Ok(())
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Divides by the number of batches, not samples, so a short final batch
    /// counts as much as a full one.
    pub fn mean(self) -> LossVector {
        match self.sum {
            None => LossVector::no_data(),
            Some(sum) => {
                let batches = self.batches;
                let values = sum.into_iter().map(|x| x / batches as f64).collect();
                LossVector::new(values, batches)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_pass_is_no_data() {
        let mean = LossAccumulator::new().mean();
        assert_eq!(mean.values(), &[0.0]);
        assert!(!mean.has_data());
        assert_eq!(mean.batches(), 0);
    }

    #[test]
    fn test_mean_is_elementwise() {
        let mut acc = LossAccumulator::new();
        acc.add(&[1.0, 4.0]).unwrap();
        acc.add(&[3.0, 2.0]).unwrap();
        let mean = acc.mean();
        assert_eq!(mean.values(), &[2.0, 3.0]);
        assert_eq!(mean.batches(), 2);
        assert!(mean.has_data());
    }

    #[test]
    fn test_mean_weights_batches_equally() {
        // a tiny last batch pulls the mean as hard as a full one
        let mut acc = LossAccumulator::new();
        acc.add(&[1.0]).unwrap();
        acc.add(&[1.0]).unwrap();
        acc.add(&[4.0]).unwrap();
        assert_eq!(acc.mean().values(), &[2.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut acc = LossAccumulator::new();
        acc.add(&[1.0, 2.0]).unwrap();
        assert_eq!(
            acc.add(&[1.0]),
            Err(LossShapeMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(acc.batches(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LossVector::new(vec![0.5, 0.25], 3).to_string(),
            "[0.500000 0.250000]"
        );
        assert_eq!(LossVector::no_data().to_string(), "[0.000000]");
    }
}
