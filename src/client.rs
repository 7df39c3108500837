//! Submission client - backend REST calls
//!
//! Every feature panel funnels its user input through this client. Submissions
//! are fire-and-forget from the panel's point of view: the panel has usually
//! dismissed itself before the outcome is known, so outcomes are surfaced via
//! the dashboard toast queue rather than a modal.
//!
//! At-most-once delivery: no retries, no idempotency key, and the request
//! timeout is left at the platform default.

use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::{FlowError, Result};

/// Backend endpoints (paths relative to the configured base URL)
pub mod endpoints {
    pub const CREATE_EVENT: &str = "/create-event";
    pub const GET_DESTRESSER_RECOMMENDATIONS: &str = "/get_destresser_recommendations";
    pub const ADD_DESTRESSER_TO_CALENDAR: &str = "/add_destresser_to_calendar";
    pub const GET_WORKOUT_PLAN: &str = "/get_workout_plan";
    pub const ADD_WORKOUT_TO_CALENDAR: &str = "/add_workout_to_calendar";
    pub const HEART_DISEASE_PREDICTION: &str = "/heart_disease_prediction";
}

/// Outcome of a submission, consumed only for a transient toast
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub status: Option<u16>,
    pub message: String,
}

impl SubmissionOutcome {
    fn accepted(endpoint: &str, status: u16) -> Self {
        Self {
            success: true,
            status: Some(status),
            message: format!("{} accepted (status {})", endpoint, status),
        }
    }

    fn rejected(endpoint: &str, status: u16) -> Self {
        Self {
            success: false,
            status: Some(status),
            message: format!("{} failed (status {})", endpoint, status),
        }
    }

    fn failed(endpoint: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            status: None,
            message: format!("{} failed: {}", endpoint, reason),
        }
    }
}

/// Request payload for destressor recommendations
#[derive(Debug, Clone, Serialize)]
pub struct DestressorRequest {
    pub stress_level: u32,
    pub available_time: u32,
    pub preferred_activities: Vec<String>,
}

impl Default for DestressorRequest {
    fn default() -> Self {
        Self {
            stress_level: 5,
            available_time: 30,
            preferred_activities: vec![
                "meditation".to_string(),
                "exercise".to_string(),
                "reading".to_string(),
            ],
        }
    }
}

/// Wire shape of the heart-disease prediction response
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HeartRiskResponse {
    pub prediction: String,
    pub probabilities: Vec<f64>,
    #[serde(default)]
    pub status: String,
}

/// Fire-and-forget HTTP POST helper shared by every panel
#[derive(Debug, Clone)]
pub struct SubmissionClient {
    http: reqwest::Client,
    base: Url,
}

impl SubmissionClient {
    /// Create a client against a backend base URL
    pub fn new(base: Url) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("flowstate/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self { http, base }
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.base.join(endpoint).map_err(|e| FlowError::InvalidUrl {
            url: format!("{}{}", self.base, endpoint),
            reason: e.to_string(),
        })
    }

    /// POST a JSON payload to an endpoint; success iff the status is 2xx.
    ///
    /// Malformed-URL, transport, and serialization failures all collapse into
    /// a failure outcome with a readable message - never a panic or an Err.
    pub async fn submit<T: Serialize>(&self, endpoint: &str, payload: &T) -> SubmissionOutcome {
        let url = match self.endpoint_url(endpoint) {
            Ok(url) => url,
            Err(e) => return SubmissionOutcome::failed(endpoint, e),
        };

        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => return SubmissionOutcome::failed(endpoint, e),
        };

        tracing::debug!(endpoint, bytes = body.len(), "Submitting to backend");

        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    SubmissionOutcome::accepted(endpoint, status.as_u16())
                } else {
                    tracing::warn!(endpoint, status = status.as_u16(), "Backend rejected submission");
                    SubmissionOutcome::rejected(endpoint, status.as_u16())
                }
            }
            Err(e) => {
                tracing::error!(endpoint, error = %e, "Backend request failed");
                SubmissionOutcome::failed(endpoint, e)
            }
        }
    }

    /// Single-step submit used by the Schedule and VoiceInput panels
    pub async fn create_event(&self, user_input: &str) -> SubmissionOutcome {
        self.submit(endpoints::CREATE_EVENT, &json!({ "user_input": user_input }))
            .await
    }

    /// Two-step destressor submission: fetch recommendations, then book them.
    ///
    /// The first call's failure is fatal - the calendar call is never issued.
    /// The second call's failure is surfaced distinctly from the first's.
    pub async fn submit_destressor(
        &self,
        request: &DestressorRequest,
        date_time: &str,
    ) -> SubmissionOutcome {
        let url = match self.endpoint_url(endpoints::GET_DESTRESSER_RECOMMENDATIONS) {
            Ok(url) => url,
            Err(e) => return SubmissionOutcome::failed(endpoints::GET_DESTRESSER_RECOMMENDATIONS, e),
        };

        let response = match self.http.post(url).json(request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                return SubmissionOutcome::failed(endpoints::GET_DESTRESSER_RECOMMENDATIONS, e)
            }
        };

        let status = response.status();
        if !status.is_success() {
            return SubmissionOutcome::rejected(
                endpoints::GET_DESTRESSER_RECOMMENDATIONS,
                status.as_u16(),
            );
        }

        // The recommendation body must decode to an array of objects before
        // we embed it in the calendar payload.
        let recommendations: Vec<serde_json::Value> = match response.json().await {
            Ok(recs) => recs,
            Err(e) => {
                return SubmissionOutcome::failed(
                    endpoints::GET_DESTRESSER_RECOMMENDATIONS,
                    format!("invalid response format ({})", e),
                )
            }
        };

        tracing::debug!(count = recommendations.len(), "Received destressor recommendations");

        self.submit(
            endpoints::ADD_DESTRESSER_TO_CALENDAR,
            &json!({
                "destresser_data": recommendations,
                "date_time": date_time,
            }),
        )
        .await
    }

    /// Two-step workout submission: fetch a plan, then forward it verbatim to
    /// the calendar endpoint. Plan fetch failure aborts the whole operation.
    pub async fn submit_workout(&self) -> SubmissionOutcome {
        let plan_url = match self.endpoint_url(endpoints::GET_WORKOUT_PLAN) {
            Ok(url) => url,
            Err(e) => return SubmissionOutcome::failed(endpoints::GET_WORKOUT_PLAN, e),
        };

        // The plan endpoint takes an empty POST.
        let response = match self.http.post(plan_url).send().await {
            Ok(resp) => resp,
            Err(e) => return SubmissionOutcome::failed(endpoints::GET_WORKOUT_PLAN, e),
        };

        let status = response.status();
        if !status.is_success() {
            return SubmissionOutcome::rejected(endpoints::GET_WORKOUT_PLAN, status.as_u16());
        }

        let plan_bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return SubmissionOutcome::failed(endpoints::GET_WORKOUT_PLAN, e),
        };

        let calendar_url = match self.endpoint_url(endpoints::ADD_WORKOUT_TO_CALENDAR) {
            Ok(url) => url,
            Err(e) => return SubmissionOutcome::failed(endpoints::ADD_WORKOUT_TO_CALENDAR, e),
        };

        let calendar_response = self
            .http
            .post(calendar_url)
            .header("Content-Type", "application/json")
            .body(plan_bytes)
            .send()
            .await;

        match calendar_response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    SubmissionOutcome::accepted(endpoints::ADD_WORKOUT_TO_CALENDAR, status.as_u16())
                } else {
                    SubmissionOutcome::rejected(endpoints::ADD_WORKOUT_TO_CALENDAR, status.as_u16())
                }
            }
            Err(e) => SubmissionOutcome::failed(endpoints::ADD_WORKOUT_TO_CALENDAR, e),
        }
    }

    /// Request a heart-disease prediction and decode the result.
    ///
    /// Unlike the fire-and-forget submissions, the HeartRisk panel blocks on
    /// this result, so decode failures are real errors here.
    pub async fn check_heart_risk(&self) -> Result<HeartRiskResponse> {
        let endpoint = endpoints::HEART_DISEASE_PREDICTION;
        let url = self.endpoint_url(endpoint)?;

        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| FlowError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FlowError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| FlowError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Format a random calendar slot within the next week as `yyyy-MM-ddTHH:mm:ss`
pub fn random_slot_within_week() -> String {
    use rand::Rng;

    let offset_secs = rand::thread_rng().gen_range(0..7 * 24 * 3600);
    let slot = chrono::Local::now() + chrono::Duration::seconds(offset_secs);
    slot.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_join() {
        let client = SubmissionClient::new(Url::parse("http://127.0.0.1:5002").unwrap());
        let url = client.endpoint_url(endpoints::CREATE_EVENT).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5002/create-event");
    }

    #[test]
    fn test_destressor_request_defaults() {
        let request = DestressorRequest::default();
        assert_eq!(request.stress_level, 5);
        assert_eq!(request.available_time, 30);
        assert_eq!(request.preferred_activities.len(), 3);
    }

    #[test]
    fn test_heart_risk_response_status_is_optional() {
        let decoded: HeartRiskResponse =
            serde_json::from_str(r#"{"prediction":"0","probabilities":[0.9,0.1]}"#).unwrap();
        assert_eq!(decoded.prediction, "0");
        assert_eq!(decoded.status, "");
    }

    #[test]
    fn test_random_slot_format() {
        let slot = random_slot_within_week();
        // yyyy-MM-ddTHH:mm:ss
        assert_eq!(slot.len(), 19);
        assert_eq!(&slot[4..5], "-");
        assert_eq!(&slot[10..11], "T");
        assert!(
            chrono::NaiveDateTime::parse_from_str(&slot, "%Y-%m-%dT%H:%M:%S").is_ok(),
            "slot should round-trip: {}",
            slot
        );
    }

    #[test]
    fn test_outcome_messages_carry_status() {
        let ok = SubmissionOutcome::accepted("/create-event", 201);
        assert!(ok.success);
        assert!(ok.message.contains("201"));

        let bad = SubmissionOutcome::rejected("/create-event", 500);
        assert!(!bad.success);
        assert!(bad.message.contains("500"));
    }
}
