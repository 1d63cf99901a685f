//! Top-k ranking of classification scores.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::constants::get_digit_labels;
use crate::core::errors::{DigitError, DigitResult};
use crate::domain::{PredictionVector, RankedEntry, RankedResult};

/// A processor for extracting top-k results from classification outputs.
///
/// Scores are ranked in descending order; equal scores keep ascending class
/// order so the output is deterministic.
#[derive(Debug, Clone)]
pub struct Topk {
    /// Optional mapping from class IDs to class names.
    class_id_map: Option<HashMap<usize, Arc<str>>>,
}

impl Topk {
    /// Creates a new Topk processor with optional class name mapping.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use oar_digit::processors::Topk;
    ///
    /// let mut class_map = HashMap::new();
    /// class_map.insert(0, "zero".to_string());
    /// class_map.insert(1, "one".to_string());
    ///
    /// let topk = Topk::new(Some(class_map));
    /// assert!(topk.has_class_names());
    /// ```
    pub fn new(class_id_map: Option<HashMap<usize, String>>) -> Self {
        Self {
            class_id_map: class_id_map.map(|map| {
                map.into_iter()
                    .map(|(id, name)| (id, Arc::from(name)))
                    .collect()
            }),
        }
    }

    /// Creates a new Topk processor without class name mapping.
    ///
    /// Class names fall back to the decimal class index, which is exactly the
    /// digit for digit models.
    pub fn without_class_names() -> Self {
        Self { class_id_map: None }
    }

    /// Creates a new Topk processor with class names from a vector.
    ///
    /// The vector index corresponds to the class ID.
    pub fn from_class_names(class_names: Vec<String>) -> Self {
        Self::new(Some(class_names.into_iter().enumerate().collect()))
    }

    /// Creates a Topk processor labelled "0" through "9".
    pub fn for_digits() -> Self {
        Self::from_class_names(get_digit_labels())
    }

    /// Ranks one prediction vector and keeps the best `k` classes.
    ///
    /// The result holds `min(k, scores.len())` entries.
    ///
    /// # Errors
    ///
    /// * `EmptyScores` - if the vector is empty (checked first).
    /// * `InvalidK` - if `k` is 0.
    /// * `NonFiniteScore` - if any score is NaN or infinite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use oar_digit::domain::PredictionVector;
    /// use oar_digit::processors::Topk;
    ///
    /// let topk = Topk::for_digits();
    /// let scores = PredictionVector::from(vec![0.1, 0.7, 0.2]);
    /// let result = topk.rank(&scores, 2).unwrap();
    /// assert_eq!(result.labels(), vec![1, 2]);
    /// ```
    pub fn rank(&self, scores: &PredictionVector, k: usize) -> DigitResult<RankedResult> {
        let scores = scores.as_slice();
        if scores.is_empty() {
            return Err(DigitError::EmptyScores);
        }
        if k == 0 {
            return Err(DigitError::InvalidK { k });
        }
        if let Some((index, &value)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            return Err(DigitError::NonFiniteScore { index, value });
        }

        let entries = extract_topk(scores, k)
            .into_iter()
            .map(|(label, score)| RankedEntry {
                label,
                name: self.class_name_for(label),
                score,
            })
            .collect();

        Ok(RankedResult::new(entries))
    }

    /// Ranks several prediction vectors with the same `k`.
    ///
    /// Fails on the first vector that violates the ranking contract.
    pub fn rank_batch(
        &self,
        predictions: &[PredictionVector],
        k: usize,
    ) -> DigitResult<Vec<RankedResult>> {
        predictions.iter().map(|p| self.rank(p, k)).collect()
    }

    /// Gets the class name for a given class ID.
    pub fn get_class_name(&self, class_id: usize) -> Option<&str> {
        self.class_id_map.as_ref()?.get(&class_id).map(|s| s.as_ref())
    }

    /// Checks if class name mapping is available.
    pub fn has_class_names(&self) -> bool {
        self.class_id_map.is_some()
    }

    /// Gets the number of classes in the mapping.
    pub fn num_classes(&self) -> Option<usize> {
        self.class_id_map.as_ref().map(|map| map.len())
    }

    fn class_name_for(&self, class_id: usize) -> Arc<str> {
        match &self.class_id_map {
            Some(map) => map
                .get(&class_id)
                .cloned()
                .unwrap_or_else(|| Arc::from(format!("Unknown({class_id})"))),
            None => Arc::from(class_id.to_string()),
        }
    }
}

impl Default for Topk {
    /// Creates a default Topk processor with digit labels.
    fn default() -> Self {
        Self::for_digits()
    }
}

/// Sorts `(index, score)` pairs by descending score, ascending index on ties,
/// and keeps the first `k`. Scores must be finite.
fn extract_topk(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    indexed.truncate(k);
    indexed
}

/// Ranks `scores` and keeps the best `k` classes, naming each class by its index.
pub fn rank(scores: &PredictionVector, k: usize) -> DigitResult<RankedResult> {
    Topk::without_class_names().rank(scores, k)
}
