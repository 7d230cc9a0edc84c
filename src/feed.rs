//! Calendar feed fetched over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use staysync_core::error::{StaySyncError, StaySyncResult};
use staysync_core::event::RawEvent;
use staysync_core::ics::parse_feed;
use staysync_core::remote::CalendarSource;
use tracing::debug;
use url::Url;

/// An iCalendar subscription URL (e.g. a Google Calendar "secret address").
pub struct FeedSource {
    client: Client,
    url: Url,
}

impl FeedSource {
    pub fn new(url: &str) -> StaySyncResult<Self> {
        Ok(FeedSource {
            client: Client::new(),
            url: feed_url(url)?,
        })
    }
}

/// Parse the feed location, treating `webcal://` as `https://`.
fn feed_url(raw: &str) -> StaySyncResult<Url> {
    let raw = raw.trim();
    let normalized = match raw.strip_prefix("webcal://") {
        Some(rest) => format!("https://{rest}"),
        None => raw.to_string(),
    };

    let url = Url::parse(&normalized)
        .map_err(|e| StaySyncError::Config(format!("Invalid feed URL '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(StaySyncError::Config(format!(
            "Unsupported feed URL scheme '{other}'"
        ))),
    }
}

#[async_trait]
impl CalendarSource for FeedSource {
    async fn fetch_all_day_events(&self) -> StaySyncResult<Vec<RawEvent>> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| StaySyncError::Feed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StaySyncError::Feed(format!("HTTP error: {status}")));
        }

        let content = response
            .text()
            .await
            .map_err(|e| StaySyncError::Feed(e.to_string()))?;
        debug!(bytes = content.len(), "fetched calendar feed");

        parse_feed(&content)
    }
}
