//! Notion destination: a stays database and a guests database.

pub mod properties;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use staysync_core::constants::UNKNOWN_GUEST;
use staysync_core::error::{StaySyncError, StaySyncResult};
use staysync_core::remote::StayStore;
use staysync_core::stay::{ExistingStay, GuestIdentity, NewStay};
use tracing::debug;

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const PAGE_SIZE: u32 = 100;

/// A database row.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

/// Notion REST client bound to the two databases.
pub struct NotionStore {
    client: Client,
    token: String,
    stays_database_id: String,
    guests_database_id: String,
}

impl NotionStore {
    pub fn new(token: &str, stays_database_id: &str, guests_database_id: &str) -> Self {
        NotionStore {
            client: Client::new(),
            token: token.to_string(),
            stays_database_id: stays_database_id.to_string(),
            guests_database_id: guests_database_id.to_string(),
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> StaySyncResult<T> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|e| StaySyncError::Destination(format!("{what}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StaySyncError::Destination(format!(
                "{what}: HTTP {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StaySyncError::Destination(format!("{what}: {e}")))
    }

    /// All rows of a database, following pagination cursors.
    async fn query_database(&self, database_id: &str) -> StaySyncResult<Vec<Page>> {
        let url = format!("{NOTION_API}/databases/{database_id}/query");
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": PAGE_SIZE });
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response: QueryResponse = self
                .send(
                    self.client.post(&url).json(&body),
                    &format!("Failed to query database {database_id}"),
                )
                .await?;

            debug!(database = database_id, rows = response.results.len(), "queried page");
            pages.extend(response.results);

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(pages)
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: Value,
        what: &str,
    ) -> StaySyncResult<Page> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });

        self.send(self.client.post(format!("{NOTION_API}/pages")).json(&body), what)
            .await
    }
}

#[async_trait]
impl StayStore for NotionStore {
    async fn list_guests(&self) -> StaySyncResult<Vec<GuestIdentity>> {
        let pages = self.query_database(&self.guests_database_id).await?;
        Ok(pages.iter().filter_map(properties::guest_from_page).collect())
    }

    async fn list_stays(&self) -> StaySyncResult<Vec<ExistingStay>> {
        let pages = self.query_database(&self.stays_database_id).await?;
        Ok(pages.iter().filter_map(properties::stay_from_page).collect())
    }

    async fn create_guest(&self, display_name: &str) -> StaySyncResult<GuestIdentity> {
        let page = self
            .create_page(
                &self.guests_database_id,
                properties::guest_properties(display_name),
                &format!("Failed to create guest {display_name}"),
            )
            .await?;

        Ok(GuestIdentity {
            record_id: page.id,
            display_name: display_name.to_string(),
        })
    }

    async fn create_stay(&self, stay: &NewStay) -> StaySyncResult<ExistingStay> {
        let page = self
            .create_page(
                &self.stays_database_id,
                properties::stay_properties(stay),
                &format!("Failed to create stay {}", stay.summary),
            )
            .await?;

        let guest_text = properties::rollup_title(&page.properties, properties::GUEST_NAME)
            .unwrap_or_else(|| UNKNOWN_GUEST.to_string());

        Ok(ExistingStay {
            record_id: page.id,
            paid: false,
            start: stay.start,
            end: stay.end,
            guest_text,
            name: Some(stay.summary.clone()),
            external_id: Some(stay.external_id.clone()),
        })
    }
}
