use crate::core::ranker::ScoringWeights;
use crate::utils::error::{FeedError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};

/// Scoring-weight overrides loaded from a TOML file. Every field is
/// optional; anything absent keeps the shipped default.
///
/// ```toml
/// [proximity]
/// very_close_bonus = 1200
/// nearby_radius_miles = 40.0
///
/// [affinity]
/// follow_bonus = 900
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub proximity: Option<ProximityConfig>,
    pub affinity: Option<AffinityConfig>,
    pub popularity: Option<PopularityConfig>,
    pub recency: Option<RecencyConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProximityConfig {
    pub very_close_bonus: Option<i64>,
    pub very_close_radius_miles: Option<f64>,
    pub close_bonus: Option<i64>,
    pub close_radius_miles: Option<f64>,
    pub nearby_bonus: Option<i64>,
    pub nearby_radius_miles: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffinityConfig {
    pub follow_bonus: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopularityConfig {
    pub points_per_like: Option<i64>,
    pub like_cap: Option<i64>,
    pub popular_threshold: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecencyConfig {
    pub this_week_bonus: Option<i64>,
    pub this_week_days: Option<f64>,
    pub this_month_bonus: Option<i64>,
    pub this_month_days: Option<f64>,
}

impl ScoringConfig {
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ScoringConfig =
            toml::from_str(&raw).map_err(|e| FeedError::ConfigParseError {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Shipped defaults with this file's overrides applied.
    pub fn into_weights(self) -> ScoringWeights {
        let mut weights = ScoringWeights::default();

        if let Some(proximity) = self.proximity {
            if let Some(v) = proximity.very_close_bonus {
                weights.very_close_bonus = v;
            }
            if let Some(v) = proximity.very_close_radius_miles {
                weights.very_close_radius_miles = v;
            }
            if let Some(v) = proximity.close_bonus {
                weights.close_bonus = v;
            }
            if let Some(v) = proximity.close_radius_miles {
                weights.close_radius_miles = v;
            }
            if let Some(v) = proximity.nearby_bonus {
                weights.nearby_bonus = v;
            }
            if let Some(v) = proximity.nearby_radius_miles {
                weights.nearby_radius_miles = v;
            }
        }

        if let Some(affinity) = self.affinity {
            if let Some(v) = affinity.follow_bonus {
                weights.follow_bonus = v;
            }
        }

        if let Some(popularity) = self.popularity {
            if let Some(v) = popularity.points_per_like {
                weights.points_per_like = v;
            }
            if let Some(v) = popularity.like_cap {
                weights.like_cap = v;
            }
            if let Some(v) = popularity.popular_threshold {
                weights.popular_threshold = v;
            }
        }

        if let Some(recency) = self.recency {
            if let Some(v) = recency.this_week_bonus {
                weights.this_week_bonus = v;
            }
            if let Some(v) = recency.this_week_days {
                weights.this_week_days = v;
            }
            if let Some(v) = recency.this_month_bonus {
                weights.this_month_bonus = v;
            }
            if let Some(v) = recency.this_month_days {
                weights.this_month_days = v;
            }
        }

        weights
    }
}

impl Validate for ScoringConfig {
    fn validate(&self) -> Result<()> {
        let resolved = self.clone().into_weights();

        if resolved.very_close_radius_miles <= 0.0 {
            return Err(invalid_value(
                "proximity.very_close_radius_miles",
                resolved.very_close_radius_miles,
                "Radius must be positive",
            ));
        }
        if resolved.close_radius_miles < resolved.very_close_radius_miles {
            return Err(invalid_value(
                "proximity.close_radius_miles",
                resolved.close_radius_miles,
                "Buckets must widen: close radius is smaller than very-close radius",
            ));
        }
        if resolved.nearby_radius_miles < resolved.close_radius_miles {
            return Err(invalid_value(
                "proximity.nearby_radius_miles",
                resolved.nearby_radius_miles,
                "Buckets must widen: nearby radius is smaller than close radius",
            ));
        }
        if resolved.points_per_like < 0 || resolved.like_cap < 0 {
            return Err(invalid_value(
                "popularity.points_per_like",
                resolved.points_per_like,
                "Like scoring cannot be negative",
            ));
        }
        if resolved.this_week_days <= 0.0
            || resolved.this_month_days < resolved.this_week_days
        {
            return Err(invalid_value(
                "recency.this_month_days",
                resolved.this_month_days,
                "Recency windows must be positive and widen",
            ));
        }

        Ok(())
    }
}

fn invalid_value(field: &str, value: impl std::fmt::Display, reason: &str) -> FeedError {
    FeedError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
