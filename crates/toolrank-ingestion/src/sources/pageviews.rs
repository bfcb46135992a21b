//! Wikimedia pageviews REST client.
//!
//! Endpoint: https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article
//!
//! Path: `/{project}/{access}/{agent}/{title}/monthly/{YYYYMMDD}/{YYYYMMDD}`,
//! start on the first of the month, end on the last day of the end month.

use anyhow::Context;
use async_trait::async_trait;
use toolrank_common::{MonthKey, Result, ToolrankError};
use tracing::{debug, instrument};
use url::Url;

use super::UnboundedSignalSource;
use crate::http::{FetchClient, HttpSettings};

pub const PAGEVIEWS_API_URL: &str =
    "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article";

pub struct PageviewsClient {
    http: FetchClient,
    base_url: Url,
    project: String,
    access: String,
    agent: String,
}

impl PageviewsClient {
    pub fn new(settings: HttpSettings) -> Result<Self> {
        let base_url = Url::parse(PAGEVIEWS_API_URL)
            .map_err(|e| ToolrankError::Config(format!("bad pageviews URL: {e}")))?;
        Ok(Self {
            http: FetchClient::new(settings)?,
            base_url,
            project: "en.wikipedia".to_string(),
            access: "all-access".to_string(),
            agent: "user".to_string(),
        })
    }

    /// Request URL for one article. The title is a single path segment, so
    /// `/` and other reserved characters in it are percent-encoded.
    pub fn article_url(&self, title: &str, start: MonthKey, end: MonthKey) -> Result<Url> {
        let mut url = self.base_url.clone();
        let start_str = start.first_day().format("%Y%m%d").to_string();
        let end_str = end.last_day().format("%Y%m%d").to_string();
        url.path_segments_mut()
            .map_err(|_| ToolrankError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend([
                self.project.as_str(),
                self.access.as_str(),
                self.agent.as_str(),
                title,
                "monthly",
                start_str.as_str(),
                end_str.as_str(),
            ]);
        Ok(url)
    }
}

/// Extract `(month, views)` pairs from a per-article response body.
///
/// Timestamps look like `2024010100`; only the year and month are used.
pub fn parse_items(body: &serde_json::Value) -> anyhow::Result<Vec<(MonthKey, f64)>> {
    let Some(items) = body["items"].as_array() else {
        return Ok(Vec::new());
    };
    let mut points = Vec::with_capacity(items.len());
    for item in items {
        let ts = item["timestamp"].as_str().context("pageview item without timestamp")?;
        let year: i32 = ts.get(..4).and_then(|y| y.parse().ok()).context("bad timestamp year")?;
        let month: u32 = ts.get(4..6).and_then(|m| m.parse().ok()).context("bad timestamp month")?;
        let key = MonthKey::new(year, month)
            .with_context(|| format!("bad pageview timestamp {ts:?}"))?;
        let views = item["views"].as_f64().context("pageview item without views")?;
        points.push((key, views));
    }
    points.sort_by_key(|(m, _)| *m);
    Ok(points)
}

#[async_trait]
impl UnboundedSignalSource for PageviewsClient {
    fn name(&self) -> &str {
        "pageviews"
    }

    #[instrument(skip(self))]
    async fn fetch_document(
        &self,
        document: &str,
        start: MonthKey,
        end: MonthKey,
    ) -> anyhow::Result<Vec<(MonthKey, f64)>> {
        let url = self.article_url(document, start, end)?;
        let body = self.http.get_json(&url).await?;
        let points = parse_items(&body)?;
        debug!(count = points.len(), "Pageviews returned months");
        Ok(points)
    }
}
