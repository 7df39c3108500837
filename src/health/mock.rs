//! Mock health source for tests and offline demos

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::error::{FlowError, Result};

use super::HealthSource;

/// Canned-payload source; connects instantly unless told to fail
pub struct MockHealthSource {
    connected: bool,
    fail_connect: bool,
}

impl Default for MockHealthSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthSource {
    pub fn new() -> Self {
        Self {
            connected: false,
            fail_connect: false,
        }
    }

    /// A source whose connection attempt always fails
    pub fn failing() -> Self {
        Self {
            connected: false,
            fail_connect: true,
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(FlowError::NotConnected)
        }
    }
}

#[async_trait]
impl HealthSource for MockHealthSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn init_connection(&mut self) -> Result<()> {
        if self.fail_connect {
            return Err(FlowError::HealthSource {
                reason: "mock connection refused".into(),
            });
        }
        self.connected = true;
        Ok(())
    }

    async fn get_activity(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Value> {
        self.ensure_connected()?;
        Ok(json!({
            "data": [{
                "metadata": { "name": "Morning walk" },
                "device_data": { "name": "Watch", "manufacturer": "Acme" },
                "distance_data": { "summary": { "steps": 8432, "distance_meters": 6100.0, "floors_climbed": 4 } },
                "active_durations_data": { "activity_seconds": 3720.0 },
                "calories_data": { "total_burned_calories": 612.0, "net_activity_calories": 318.0 },
                "heart_rate_data": { "summary": { "avg_hr_bpm": 72.5, "max_hr_bpm": 131.0, "avg_hrv_sdnn": 48.0 } },
                "movement_data": { "avg_speed_meters_per_second": 1.4 },
                "power_data": { "avg_watts": 180.0 },
            }]
        }))
    }

    async fn get_daily(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Value> {
        self.ensure_connected()?;
        Ok(json!({
            "data": [{
                "scores": { "recovery": 81 },
                "stress_data": { "avg_stress_level": 31.0 },
            }]
        }))
    }

    async fn get_sleep(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Value> {
        self.ensure_connected()?;
        Ok(json!({
            "data": [{
                "sleep_durations_data": {
                    "asleep": {
                        "duration_asleep_state_seconds": 27000.0,
                        "duration_deep_sleep_state_seconds": 5400.0,
                    }
                }
            }]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthSummary;

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_connect_then_fetch() {
        let mut source = MockHealthSource::new();
        assert!(!source.is_connected());
        source.init_connection().await.unwrap();
        assert!(source.is_connected());

        let (start, end) = range();
        let activity = source.get_activity(start, end).await.unwrap();
        let daily = source.get_daily(start, end).await.unwrap();
        let sleep = source.get_sleep(start, end).await.unwrap();

        let summary = HealthSummary::from_payloads(&activity, &daily, &sleep);
        assert_eq!(summary.steps, Some(8432));
        assert_eq!(summary.sleep_hours, Some(7.5));
        assert_eq!(summary.recovery_score, Some(81));
    }

    #[tokio::test]
    async fn test_fetch_without_connect_fails() {
        let source = MockHealthSource::new();
        let (start, end) = range();
        assert!(source.get_daily(start, end).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_source() {
        let mut source = MockHealthSource::failing();
        assert!(source.init_connection().await.is_err());
        assert!(!source.is_connected());
    }
}
