//! Notification backends. Delivery is fire-and-forget: a failed webhook is
//! logged and never propagates into the run.

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use pressroom_common::Severity;
use pressroom_pipeline::traits::Notifier;

/// Slack incoming-webhook notifier with severity-coded attachments.
pub struct SlackNotifier {
    webhook_url: String,
    http: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            http: reqwest::Client::new(),
        }
    }

    fn color(severity: Severity) -> &'static str {
        match severity {
            Severity::Info => "#439FE0",
            Severity::Success => "good",
            Severity::Warning => "warning",
            Severity::Error => "danger",
        }
    }

    fn emoji(severity: Severity) -> &'static str {
        match severity {
            Severity::Info => ":information_source:",
            Severity::Success => ":white_check_mark:",
            Severity::Warning => ":warning:",
            Severity::Error => ":rotating_light:",
        }
    }

    async fn post(&self, message: &str, severity: Severity) -> anyhow::Result<()> {
        let payload = json!({
            "attachments": [{
                "color": Self::color(severity),
                "text": format!("{} {message}", Self::emoji(severity)),
            }],
            "unfurl_links": false,
        });

        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Slack webhook returned {status}: {body}");
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        if let Err(e) = self.post(message, severity).await {
            warn!(error = %e, "Slack notification failed");
        }
    }
}

/// Log-only notifier used when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!("{message}"),
            Severity::Warning => warn!("{message}"),
            _ => info!("{message}"),
        }
    }
}
