//! Personalized event ordering: a weighted sum of proximity, follow
//! affinity, popularity, and recency, applied per event and stable-sorted.

use crate::core::location::distance_miles;
use crate::domain::model::{Event, ResolvedLocation};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Tuning constants for the feed. The defaults pin the values the product
/// ships with today; nothing downstream assumes them beyond that.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    pub very_close_bonus: i64,
    pub very_close_radius_miles: f64,
    pub close_bonus: i64,
    pub close_radius_miles: f64,
    pub nearby_bonus: i64,
    pub nearby_radius_miles: f64,
    pub follow_bonus: i64,
    pub points_per_like: i64,
    pub like_cap: i64,
    pub popular_threshold: u32,
    pub this_week_bonus: i64,
    pub this_week_days: f64,
    pub this_month_bonus: i64,
    pub this_month_days: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            very_close_bonus: 1000,
            very_close_radius_miles: 5.0,
            close_bonus: 500,
            close_radius_miles: 15.0,
            nearby_bonus: 100,
            nearby_radius_miles: 50.0,
            follow_bonus: 750,
            points_per_like: 10,
            like_cap: 200,
            popular_threshold: 10,
            this_week_bonus: 50,
            this_week_days: 7.0,
            this_month_bonus: 25,
            this_month_days: 30.0,
        }
    }
}

struct ScoredEvent {
    event: Event,
    priority: i64,
    reasons: Vec<&'static str>,
}

pub struct Ranker {
    weights: ScoringWeights,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Reorders `events` by descending priority. The sort is stable, so
    /// equal-priority events keep their relative input order, and the result
    /// contains exactly the input elements: nothing is dropped or duplicated.
    /// Missing location or coordinates simply contribute no proximity score.
    pub fn rank(
        &self,
        events: Vec<Event>,
        user_location: Option<&ResolvedLocation>,
        followed_church_ids: &HashSet<i64>,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        let mut scored: Vec<ScoredEvent> = events
            .into_iter()
            .map(|event| self.score(event, user_location, followed_church_ids, now))
            .collect();

        scored.sort_by(|a, b| b.priority.cmp(&a.priority));

        for entry in scored.iter().take(3) {
            tracing::debug!(
                "event {} priority {} [{}]",
                entry.event.id,
                entry.priority,
                entry.reasons.join(", ")
            );
        }

        scored.into_iter().map(|entry| entry.event).collect()
    }

    fn score(
        &self,
        event: Event,
        user_location: Option<&ResolvedLocation>,
        followed_church_ids: &HashSet<i64>,
        now: DateTime<Utc>,
    ) -> ScoredEvent {
        let mut priority = 0;
        let mut reasons = Vec::new();

        let components = [
            self.proximity_score(&event, user_location),
            self.affinity_score(&event, followed_church_ids),
            self.popularity_score(&event),
            self.recency_score(&event, now),
        ];
        for (points, reason) in components {
            priority += points;
            if let Some(reason) = reason {
                reasons.push(reason);
            }
        }

        ScoredEvent {
            event,
            priority,
            reasons,
        }
    }

    /// Distance-bucket bonus. Zero when the user has no resolved location,
    /// the event has no coordinates, or the event is beyond the widest
    /// bucket — such events are not excluded, only unranked on this axis.
    fn proximity_score(
        &self,
        event: &Event,
        user_location: Option<&ResolvedLocation>,
    ) -> (i64, Option<&'static str>) {
        let (Some(user), Some(event_coords)) = (user_location, event.coordinates()) else {
            return (0, None);
        };

        let distance = distance_miles(user.coordinates, event_coords);
        if distance <= self.weights.very_close_radius_miles {
            (self.weights.very_close_bonus, Some("Very close to you"))
        } else if distance <= self.weights.close_radius_miles {
            (self.weights.close_bonus, Some("Close to you"))
        } else if distance <= self.weights.nearby_radius_miles {
            (self.weights.nearby_bonus, Some("Nearby"))
        } else {
            (0, None)
        }
    }

    fn affinity_score(
        &self,
        event: &Event,
        followed_church_ids: &HashSet<i64>,
    ) -> (i64, Option<&'static str>) {
        if followed_church_ids.contains(&event.church_id) {
            (self.weights.follow_bonus, Some("From a church you follow"))
        } else {
            (0, None)
        }
    }

    /// Capped linear like bonus, so a single viral event cannot drown out
    /// distance and affinity signals.
    fn popularity_score(&self, event: &Event) -> (i64, Option<&'static str>) {
        let likes = i64::from(event.like_count.unwrap_or(0));
        let points = (likes * self.weights.points_per_like).min(self.weights.like_cap);
        let reason = if likes > i64::from(self.weights.popular_threshold) {
            Some("Popular event")
        } else {
            None
        };
        (points, reason)
    }

    /// Bonus for events starting soon. Past events score zero here but stay
    /// in the feed.
    fn recency_score(&self, event: &Event, now: DateTime<Utc>) -> (i64, Option<&'static str>) {
        let days_until_event =
            (event.start_datetime - now).num_milliseconds() as f64 / MILLIS_PER_DAY;

        if (0.0..=self.weights.this_week_days).contains(&days_until_event) {
            (self.weights.this_week_bonus, Some("Coming soon"))
        } else if days_until_event > self.weights.this_week_days
            && days_until_event <= self.weights.this_month_days
        {
            (self.weights.this_month_bonus, None)
        } else {
            (0, None)
        }
    }
}
