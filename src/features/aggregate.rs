//! Aggregations over a trailing window and the insufficient-history policy

use serde::{Deserialize, Serialize};

use crate::{FootyError, Result};

/// A feature value emitted for one team before one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Value(f64),
    /// Fewer prior matches than the feature requires
    InsufficientHistory,
    /// Enough history, but the quantity has no value (e.g. a zero denominator)
    Undefined,
}

impl FeatureValue {
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) => FeatureValue::Value(v),
            None => FeatureValue::InsufficientHistory,
        }
    }

    /// A value computed from sufficient history; None means undefined
    pub fn or_undefined(value: Option<f64>) -> Self {
        value.map_or(FeatureValue::Undefined, FeatureValue::Value)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            FeatureValue::Value(v) => Some(v),
            FeatureValue::InsufficientHistory | FeatureValue::Undefined => None,
        }
    }

    pub fn is_insufficient(self) -> bool {
        matches!(self, FeatureValue::InsufficientHistory)
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, FeatureValue::Undefined)
    }

    /// Resolve to a table cell under the given policy.
    ///
    /// Only insufficient history is zero filled; an undefined value stays
    /// empty under every policy.
    pub fn resolve(self, policy: HistoryPolicy) -> Option<f64> {
        match (self, policy) {
            (FeatureValue::Value(v), _) => Some(v),
            (FeatureValue::InsufficientHistory, HistoryPolicy::Missing) => None,
            (FeatureValue::InsufficientHistory, HistoryPolicy::ZeroFill) => Some(0.0),
            (FeatureValue::Undefined, _) => None,
        }
    }
}

/// What a table stores where a team lacks enough history.
///
/// `Missing` leaves the cell empty so early-season rows can be excluded;
/// `ZeroFill` writes 0.0 so every row can take part in training.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    #[default]
    Missing,
    ZeroFill,
}

/// Reduction applied to a window of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Mean,
    /// Population standard deviation
    StdDev,
    /// Weights ordered most recent first
    WeightedMean(Vec<f64>),
}

impl Aggregation {
    pub fn validate(&self) -> Result<()> {
        match self {
            Aggregation::WeightedMean(weights) => check_weights(weights),
            _ => Ok(()),
        }
    }

    /// Reduce values ordered oldest to newest. Returns None when empty.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        match self {
            Aggregation::Mean => Some(values.iter().sum::<f64>() / n),
            Aggregation::StdDev => {
                let mean = values.iter().sum::<f64>() / n;
                let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                Some(variance.sqrt())
            }
            Aggregation::WeightedMean(weights) => {
                // Leading weights cover the most recent values; a short window
                // renormalizes over the weights it uses.
                let mut total = 0.0;
                let mut weight_sum = 0.0;
                for (value, weight) in values.iter().rev().zip(weights.iter()) {
                    total += value * weight;
                    weight_sum += weight;
                }
                if weight_sum > 0.0 {
                    Some(total / weight_sum)
                } else {
                    None
                }
            }
        }
    }
}

/// Reject weight vectors that cannot form a weighted mean
pub fn check_weights(weights: &[f64]) -> Result<()> {
    if weights.is_empty() {
        return Err(FootyError::InvalidWeights("empty weight vector".to_string()));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(FootyError::InvalidWeights(format!(
            "weights must be finite and non-negative: {:?}",
            weights
        )));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(FootyError::InvalidWeights("weights sum to zero".to_string()));
    }
    Ok(())
}

/// Ratio of two window sums, None when the denominator is zero
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}
