//! Recency decay: hyperbolic forgetting over wall-clock hours.
//!
//!   recency = max(floor, 1 / (1 + age_hours))
//!
//! A turn is fully recent (1.0) at creation, halves after one hour, and
//! never drops below the floor (0.1 by default), so very old turns keep a
//! small but non-zero pull during retrieval.
//!
//! Only Working Memory applies this law. Episodic entries keep whatever
//! score they held when they were archived.

use chrono::{DateTime, Utc};

use crate::types::hours_between;

/// Default lower bound of the recency curve.
pub const RECENCY_FLOOR: f32 = 0.1;

/// Recency for an entry of the given age.
///
/// Non-finite or negative ages are treated as zero.
#[must_use]
pub fn recency(age_hours: f64, floor: f32) -> f32 {
    let age = if age_hours.is_finite() { age_hours.max(0.0) } else { 0.0 };
    let raw = (1.0 / (1.0 + age)) as f32;
    raw.clamp(floor, 1.0)
}

/// Recency of an entry created at `created`, observed at `now`.
#[must_use]
pub fn recency_at(created: DateTime<Utc>, now: DateTime<Utc>, floor: f32) -> f32 {
    recency(hours_between(created, now), floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fresh_entry_is_fully_recent() {
        assert!((recency(0.0, RECENCY_FLOOR) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn one_hour_halves_recency() {
        assert!((recency(1.0, RECENCY_FLOOR) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn decays_monotonically_to_floor() {
        let mut last = f32::MAX;
        for hours in [0.0, 0.5, 1.0, 3.0, 9.0, 50.0, 10_000.0] {
            let r = recency(hours, RECENCY_FLOOR);
            assert!(r <= last, "recency must not increase with age");
            assert!(r >= RECENCY_FLOOR);
            last = r;
        }
        assert!((recency(10_000.0, RECENCY_FLOOR) - RECENCY_FLOOR).abs() < f32::EPSILON);
    }

    #[test]
    fn bad_ages_are_treated_as_fresh() {
        assert!((recency(f64::NAN, RECENCY_FLOOR) - 1.0).abs() < f32::EPSILON);
        assert!((recency(-5.0, RECENCY_FLOOR) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn wall_clock_variant_matches() {
        let created = Utc::now();
        let r = recency_at(created, created + Duration::hours(3), RECENCY_FLOOR);
        assert!((r - 0.25).abs() < 1e-6);
    }
}
