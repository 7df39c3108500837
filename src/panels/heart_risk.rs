//! Heart risk panel - the one blocking flow
//!
//! Unlike the other panels, HeartRisk stays open: the check runs with the
//! panel in `Submitting`, the decoded prediction is shown in `Result`, and
//! only then may the user dismiss it.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::client::{HeartRiskResponse, SubmissionClient};
use crate::scene::PanelKind;

use super::{PanelPhase, PanelShell, UiEvent};

/// Derived view of a prediction response
#[derive(Debug, Clone, PartialEq)]
pub struct HeartRiskReport {
    /// 0-100, higher is healthier
    pub score: u8,
    pub message: &'static str,
    pub needs_attention: bool,
}

impl HeartRiskReport {
    /// Score is `100 - P(disease) * 100`; prediction "1" flags attention.
    pub fn evaluate(response: &HeartRiskResponse) -> Self {
        let probability = response.probabilities.get(1).copied().unwrap_or(0.0);
        let score = (100.0 - probability * 100.0).round().clamp(0.0, 100.0) as u8;
        let needs_attention = response.prediction == "1";
        let message = if needs_attention {
            "Your heart health needs attention"
        } else {
            "Your heart health is regular"
        };

        Self {
            score,
            message,
            needs_attention,
        }
    }
}

/// Check-then-display panel for `/heart_disease_prediction`
#[derive(Debug)]
pub struct HeartRiskPanel {
    pub shell: PanelShell,
    pub report: Option<HeartRiskReport>,
    pub error: Option<String>,
}

impl HeartRiskPanel {
    pub fn new() -> Self {
        Self {
            shell: PanelShell::new(PanelKind::HeartRisk),
            report: None,
            error: None,
        }
    }

    /// Kick off the prediction call; the result arrives as a
    /// [`UiEvent::HeartRisk`] on the dashboard's event channel.
    pub fn check(&mut self, client: &Arc<SubmissionClient>, events: &UnboundedSender<UiEvent>) {
        if !self.shell.begin_submit() {
            return;
        }
        self.error = None;
        self.shell.set_phase(PanelPhase::Submitting);

        let client = Arc::clone(client);
        let events = events.clone();
        tokio::spawn(async move {
            let result = client
                .check_heart_risk()
                .await
                .map_err(|e| e.to_string());
            let _ = events.send(UiEvent::HeartRisk(result));
        });
    }

    /// Apply the resolved check. The panel is guaranteed still mounted (it
    /// blocks on the result before allowing dismissal).
    pub fn on_result(&mut self, result: Result<HeartRiskResponse, String>) {
        self.shell.finish_submit();
        match result {
            Ok(response) => {
                self.report = Some(HeartRiskReport::evaluate(&response));
                self.shell.set_phase(PanelPhase::Result);
            }
            Err(message) => {
                self.error = Some(message);
                self.shell.set_phase(PanelPhase::Visible);
            }
        }
    }
}

impl Default for HeartRiskPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(prediction: &str, probabilities: &[f64], status: &str) -> HeartRiskResponse {
        serde_json::from_value(serde_json::json!({
            "prediction": prediction,
            "probabilities": probabilities,
            "status": status,
        }))
        .unwrap()
    }

    #[test]
    fn test_high_risk_report() {
        let report = HeartRiskReport::evaluate(&response("1", &[0.2, 0.8], "ok"));
        assert_eq!(report.score, 20);
        assert!(report.needs_attention);
        assert!(report.message.contains("needs attention"));
    }

    #[test]
    fn test_regular_report() {
        let report = HeartRiskReport::evaluate(&response("0", &[0.9, 0.1], ""));
        assert_eq!(report.score, 90);
        assert!(!report.needs_attention);
        assert!(report.message.contains("regular"));
    }

    #[test]
    fn test_missing_probability_is_tolerated() {
        let report = HeartRiskReport::evaluate(&response("0", &[], ""));
        assert_eq!(report.score, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_sub_state() {
        let mut panel = HeartRiskPanel::new();
        assert!(panel.shell.begin_submit());
        panel.shell.set_phase(PanelPhase::Submitting);

        panel.on_result(Ok(response("1", &[0.3, 0.7], "ok")));
        assert_eq!(panel.shell.phase(), PanelPhase::Result);
        assert_eq!(panel.report.as_ref().unwrap().score, 30);
        assert!(!panel.shell.is_in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_returns_to_visible() {
        let mut panel = HeartRiskPanel::new();
        assert!(panel.shell.begin_submit());
        panel.shell.set_phase(PanelPhase::Submitting);

        panel.on_result(Err("/heart_disease_prediction returned status 500".into()));
        assert_eq!(panel.shell.phase(), PanelPhase::Visible);
        assert!(panel.report.is_none());
        assert!(panel.error.as_ref().unwrap().contains("500"));
        // The guard releases so the user can retry.
        assert!(!panel.shell.is_in_flight());
    }
}
