//! Subject aggregation: component averages and the weighted subject final.
//!
//! A component type with nothing graded drops out of both sides of the
//! weighted mean instead of counting as zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GradingError;
use crate::models::{ComponentScoreSet, ComponentType, GradeEntry, SubjectAverage, SubjectScores};

pub const MIN_POINTS: f64 = 0.0;
pub const MAX_POINTS: f64 = 10.0;

/// Round half-up to 2 decimal places (half away from zero for negatives).
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    // products like 1.005 * 100.0 land a hair under the half
    (scaled + scaled.signum() * 1e-9).round() / 100.0
}

/// Relative weight of each component type in a subject final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct WeightTable {
    weights: BTreeMap<ComponentType, f64>,
}

impl WeightTable {
    pub fn new<I>(pairs: I) -> Result<Self, GradingError>
    where
        I: IntoIterator<Item = (ComponentType, f64)>,
    {
        let mut weights = BTreeMap::new();
        for (component, weight) in pairs {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(GradingError::invalid_weight(
                    component,
                    format!("weight {weight} must be positive"),
                ));
            }
            if weights.insert(component, weight).is_some() {
                return Err(GradingError::invalid_weight(
                    component,
                    "listed more than once",
                ));
            }
        }
        Ok(WeightTable { weights })
    }

    /// oral 1, fifteen_min 1, one_period 2, midterm 2, final 3
    pub fn vietnamese() -> Self {
        let weights = BTreeMap::from([
            (ComponentType::Oral, 1.0),
            (ComponentType::FifteenMin, 1.0),
            (ComponentType::OnePeriod, 2.0),
            (ComponentType::Midterm, 2.0),
            (ComponentType::Final, 3.0),
        ]);
        WeightTable { weights }
    }

    pub fn weight(&self, component: ComponentType) -> Option<f64> {
        self.weights.get(&component).copied()
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        WeightTable::vietnamese()
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightTable {
    type Error = String;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut pairs = Vec::with_capacity(map.len());
        for (key, weight) in map {
            let component = key
                .parse::<ComponentType>()
                .map_err(|err| err.to_string())?;
            pairs.push((component, weight));
        }
        WeightTable::new(pairs).map_err(|err| err.to_string())
    }
}

impl From<WeightTable> for BTreeMap<String, f64> {
    fn from(table: WeightTable) -> Self {
        table
            .weights
            .into_iter()
            .map(|(component, weight)| (component.as_str().to_string(), weight))
            .collect()
    }
}

/// Points an entry contributes, or `None` when it does not count at all.
fn contribution(entry: &GradeEntry) -> Result<Option<f64>, GradingError> {
    if entry.is_excused {
        return Ok(None);
    }
    match entry.points_earned {
        Some(points) => {
            if !points.is_finite() || !(MIN_POINTS..=MAX_POINTS).contains(&points) {
                return Err(GradingError::MalformedGradeEntry {
                    component: entry.component_type,
                    points,
                });
            }
            Ok(Some(points))
        }
        None if entry.is_missing => Ok(Some(0.0)),
        // recorded but not yet graded
        None => Ok(None),
    }
}

/// Mean of the contributing entries, `None` if nothing contributes.
pub fn component_average(entries: &[GradeEntry]) -> Result<Option<f64>, GradingError> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for entry in entries {
        if let Some(points) = contribution(entry)? {
            sum += points;
            count += 1;
        }
    }
    Ok(if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    })
}

#[derive(Debug, Clone, Default)]
pub struct SubjectAggregator {
    weights: WeightTable,
    /// Lowest scores dropped from homogeneous score lists.
    drop_lowest: usize,
}

impl SubjectAggregator {
    pub fn new(weights: WeightTable) -> Self {
        SubjectAggregator {
            weights,
            drop_lowest: 0,
        }
    }

    pub fn with_drop_lowest(mut self, n: usize) -> Self {
        self.drop_lowest = n;
        self
    }

    /// Average of a plain list of scores under this aggregator's
    /// drop-lowest policy. `None` for an empty list.
    pub fn average_dropping_lowest(&self, scores: &[f64]) -> Result<Option<f64>, GradingError> {
        if let Some(points) = scores
            .iter()
            .copied()
            .find(|points| !points.is_finite() || !(MIN_POINTS..=MAX_POINTS).contains(points))
        {
            return Err(GradingError::MalformedScore { points });
        }
        Ok(HomogeneousScores::new(scores.iter().copied())
            .drop_lowest(self.drop_lowest)
            .average())
    }

    /// Component averages (every type present, ungraded as `None`) and the
    /// rounded weighted final.
    pub fn final_grade(
        &self,
        scores: &ComponentScoreSet,
    ) -> Result<(f64, BTreeMap<ComponentType, Option<f64>>), GradingError> {
        let mut averages = BTreeMap::new();
        let mut sum = 0.0;
        let mut total_weight = 0.0;

        for component in ComponentType::ALL {
            let average = component_average(scores.entries(component))?;
            if let Some(value) = average {
                let weight = self.weights.weight(component).ok_or_else(|| {
                    GradingError::invalid_weight(component, "no weight configured")
                })?;
                sum += value * weight;
                total_weight += weight;
            }
            averages.insert(component, average.map(round2));
        }

        let final_grade = if total_weight > 0.0 {
            round2(sum / total_weight)
        } else {
            0.0
        };
        Ok((final_grade, averages))
    }

    pub fn aggregate(&self, subject: &SubjectScores) -> Result<SubjectAverage, GradingError> {
        let (final_grade, component_averages) = self.final_grade(&subject.scores)?;
        tracing::debug!(
            subject_id = %subject.subject_id,
            final_grade,
            "aggregated subject"
        );
        Ok(SubjectAverage {
            subject_id: subject.subject_id.clone(),
            subject_name: subject.subject_name.clone(),
            final_grade,
            component_averages,
        })
    }
}

/// A homogeneous list of scores (e.g. plain assignments) under a
/// drop-lowest policy. Re-applying the same policy never drops more.
#[derive(Debug, Clone, PartialEq)]
pub struct HomogeneousScores {
    kept: Vec<f64>,
    dropped: Vec<f64>,
}

impl HomogeneousScores {
    pub fn new(scores: impl IntoIterator<Item = f64>) -> Self {
        let mut kept: Vec<f64> = scores.into_iter().collect();
        kept.sort_by(f64::total_cmp);
        HomogeneousScores {
            kept,
            dropped: Vec::new(),
        }
    }

    /// Drop the lowest `n` scores overall, clamped so one score always remains.
    pub fn drop_lowest(&self, n: usize) -> Self {
        let mut all: Vec<f64> = self.dropped.iter().chain(&self.kept).copied().collect();
        all.sort_by(f64::total_cmp);
        let cut = n.min(all.len().saturating_sub(1));
        let kept = all.split_off(cut);
        HomogeneousScores { kept, dropped: all }
    }

    pub fn kept(&self) -> &[f64] {
        &self.kept
    }

    pub fn dropped(&self) -> &[f64] {
        &self.dropped
    }

    pub fn average(&self) -> Option<f64> {
        if self.kept.is_empty() {
            return None;
        }
        Some(round2(self.kept.iter().sum::<f64>() / self.kept.len() as f64))
    }
}
