use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::warn;

use pressroom_common::{AnalyticsSnapshot, PageStat};
use pressroom_pipeline::traits::AnalyticsProvider;

/// REST analytics provider. Fetch failures never abort a run: they come back
/// as an error-shaped snapshot with no pages, which is valid Analyst input.
pub struct HttpAnalytics {
    base_url: String,
    property_id: String,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct TopPagesResponse {
    #[serde(default)]
    rows: Vec<PageStat>,
}

impl HttpAnalytics {
    pub fn new(base_url: String, property_id: String, api_key: String) -> Self {
        Self {
            base_url,
            property_id,
            api_key,
            http: reqwest::Client::new(),
        }
    }

    async fn fetch(&self, date: &str) -> Result<Vec<PageStat>> {
        let url = format!(
            "{}/properties/{}/reports/top-pages",
            self.base_url, self.property_id
        );
        let resp = self
            .http
            .get(&url)
            .query(&[("date", date)])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("analytics API returned {status}: {body}");
        }

        let report: TopPagesResponse = resp.json().await?;
        Ok(report.rows)
    }
}

#[async_trait]
impl AnalyticsProvider for HttpAnalytics {
    async fn fetch_snapshot(&self, days_ago: u32) -> Result<AnalyticsSnapshot> {
        let date = (Utc::now() - Duration::days(days_ago as i64))
            .format("%Y-%m-%d")
            .to_string();

        match self.fetch(&date).await {
            Ok(top_pages) => Ok(AnalyticsSnapshot {
                date,
                top_pages,
                error: None,
            }),
            Err(e) => {
                warn!(error = %e, "Analytics fetch failed, returning empty snapshot");
                Ok(AnalyticsSnapshot {
                    date,
                    top_pages: Vec::new(),
                    error: Some(e.to_string()),
                })
            }
        }
    }
}

/// Stands in when no analytics provider is configured. Always an empty,
/// error-shaped snapshot; the Analyst falls back to seasonal topics.
pub struct UnconfiguredAnalytics;

#[async_trait]
impl AnalyticsProvider for UnconfiguredAnalytics {
    async fn fetch_snapshot(&self, days_ago: u32) -> Result<AnalyticsSnapshot> {
        let date = (Utc::now() - Duration::days(days_ago as i64))
            .format("%Y-%m-%d")
            .to_string();
        Ok(AnalyticsSnapshot {
            date,
            top_pages: Vec::new(),
            error: Some("analytics provider not configured".to_string()),
        })
    }
}
