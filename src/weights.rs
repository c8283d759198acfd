use crate::registry::{Criterion, ValidationError};
use serde::Serialize;

/// The weight budget every class configuration is reconciled against.
pub const FULL_WEIGHT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Valid,
    Exceeded,
    Insufficient,
}

pub fn weight_sum(criteria: &[Criterion]) -> f64 {
    criteria.iter().map(|c| c.weight).sum()
}

pub fn classify(sum: f64) -> Classification {
    if sum == FULL_WEIGHT {
        Classification::Valid
    } else if sum > FULL_WEIGHT {
        Classification::Exceeded
    } else {
        Classification::Insufficient
    }
}

/// Budget left for a new criterion, or for an edit of `excluding` (an edit
/// may reuse its own prior weight).
pub fn remaining_budget(criteria: &[Criterion], excluding: Option<&str>) -> f64 {
    let committed: f64 = criteria
        .iter()
        .filter(|c| excluding.map(|id| c.id != id).unwrap_or(true))
        .map(|c| c.weight)
        .sum();
    FULL_WEIGHT - committed
}

/// Pre-check for Add/Edit/SetWeight commits. The resulting sum must stay
/// within the 100% ceiling; the rejection message reports both.
pub fn check_commit(
    criteria: &[Criterion],
    new_weight: f64,
    excluding: Option<&str>,
) -> Result<(), ValidationError> {
    let resulting = weight_sum(criteria) - excluded_weight(criteria, excluding) + new_weight;
    if resulting > FULL_WEIGHT {
        return Err(ValidationError::budget_exceeded(resulting));
    }
    Ok(())
}

fn excluded_weight(criteria: &[Criterion], excluding: Option<&str>) -> f64 {
    excluding
        .and_then(|id| criteria.iter().find(|c| c.id == id))
        .map(|c| c.weight)
        .unwrap_or(0.0)
}

/// Indicators the UI renders next to the criteria table. Derived from the
/// criteria snapshot on every read; nothing here is cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightSummary {
    pub sum: f64,
    pub classification: Classification,
    pub overage: f64,
    pub shortfall: f64,
    /// Normalized fill ratio for the progress bar, clamped to [0, 1].
    pub progress: f64,
}

pub fn summarize(criteria: &[Criterion]) -> WeightSummary {
    let sum = weight_sum(criteria);
    WeightSummary {
        sum,
        classification: classify(sum),
        overage: (sum - FULL_WEIGHT).max(0.0),
        shortfall: (FULL_WEIGHT - sum).max(0.0),
        progress: sum.min(FULL_WEIGHT) / FULL_WEIGHT,
    }
}
