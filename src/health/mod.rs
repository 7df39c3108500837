//! Health data aggregation
//!
//! The aggregator SDK is an opaque asynchronous data provider: connect once,
//! then pull activity / daily / sleep payloads for a date range. Payload
//! schemas are the aggregator's business; the dashboard only extracts a
//! handful of display metrics and tolerates anything missing.

mod mock;
mod terra;

pub use mock::MockHealthSource;
pub use terra::TerraClient;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;

/// An opaque asynchronous health data provider
#[async_trait]
pub trait HealthSource: Send + Sync {
    fn name(&self) -> &str;

    fn is_connected(&self) -> bool;

    /// Establish the connection (auth token exchange). Must succeed before
    /// any fetch.
    async fn init_connection(&mut self) -> Result<()>;

    async fn get_activity(&self, start: NaiveDate, end: NaiveDate) -> Result<Value>;

    async fn get_daily(&self, start: NaiveDate, end: NaiveDate) -> Result<Value>;

    async fn get_sleep(&self, start: NaiveDate, end: NaiveDate) -> Result<Value>;
}

/// Display metrics pulled out of the opaque payloads. Every field is
/// optional; absent data renders as a dash, never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthSummary {
    pub steps: Option<u64>,
    pub distance_km: Option<f64>,
    pub active_minutes: Option<u64>,
    pub calories: Option<f64>,
    pub avg_bpm: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub recovery_score: Option<u64>,
}

impl HealthSummary {
    /// Extract metrics from activity, daily, and sleep payloads
    pub fn from_payloads(activity: &Value, daily: &Value, sleep: &Value) -> Self {
        let first = activity.pointer("/data/0");

        let steps = first
            .and_then(|a| a.pointer("/distance_data/summary/steps"))
            .and_then(Value::as_u64);

        let distance_km = first
            .and_then(|a| a.pointer("/distance_data/summary/distance_meters"))
            .and_then(Value::as_f64)
            .map(|m| m / 1000.0);

        let active_minutes = first
            .and_then(|a| a.pointer("/active_durations_data/activity_seconds"))
            .and_then(Value::as_f64)
            .map(|s| (s / 60.0) as u64);

        let calories = first
            .and_then(|a| a.pointer("/calories_data/total_burned_calories"))
            .and_then(Value::as_f64);

        let avg_bpm = first
            .and_then(|a| a.pointer("/heart_rate_data/summary/avg_hr_bpm"))
            .and_then(Value::as_f64);

        let sleep_hours = sleep
            .pointer("/data/0/sleep_durations_data/asleep/duration_asleep_state_seconds")
            .and_then(Value::as_f64)
            .map(|s| s / 3600.0);

        let recovery_score = daily.pointer("/data/0/scores/recovery").and_then(Value::as_u64);

        Self {
            steps,
            distance_km,
            active_minutes,
            calories,
            avg_bpm,
            sleep_hours,
            recovery_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_from_full_payloads() {
        let activity = json!({
            "data": [{
                "distance_data": { "summary": { "steps": 8432, "distance_meters": 6100.0 } },
                "active_durations_data": { "activity_seconds": 3720.0 },
                "calories_data": { "total_burned_calories": 612.0 },
                "heart_rate_data": { "summary": { "avg_hr_bpm": 72.5 } },
            }]
        });
        let daily = json!({ "data": [{ "scores": { "recovery": 81 } }] });
        let sleep = json!({
            "data": [{
                "sleep_durations_data": { "asleep": { "duration_asleep_state_seconds": 27000.0 } }
            }]
        });

        let summary = HealthSummary::from_payloads(&activity, &daily, &sleep);
        assert_eq!(summary.steps, Some(8432));
        assert_eq!(summary.distance_km, Some(6.1));
        assert_eq!(summary.active_minutes, Some(62));
        assert_eq!(summary.calories, Some(612.0));
        assert_eq!(summary.avg_bpm, Some(72.5));
        assert_eq!(summary.sleep_hours, Some(7.5));
        assert_eq!(summary.recovery_score, Some(81));
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let summary = HealthSummary::from_payloads(&json!({}), &json!(null), &json!(null));
        assert_eq!(summary, HealthSummary::default());

        let partial = json!({ "data": [{ "distance_data": { "summary": { "steps": 12 } } }] });
        let summary = HealthSummary::from_payloads(&partial, &json!({}), &json!({}));
        assert_eq!(summary.steps, Some(12));
        assert_eq!(summary.calories, None);
    }
}
