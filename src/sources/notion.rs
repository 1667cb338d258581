//! Notion metadata collaborator.
//!
//! The experiment dashboard is a Notion database; each row names an
//! experiment and carries its label, start/stop timestamps and a Completed
//! checkbox. Rows with missing fields are logged and skipped so one sloppy
//! dashboard entry cannot take down a run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use serde_json::{json, Value};

use crate::config::Credentials;

const NOTION_API_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// One row of the experiment dashboard.
#[derive(Debug, Clone)]
pub struct DashboardRow {
    /// Value of the "Experimental Name" column, matched against CLI IDs.
    pub name: String,
    pub label: String,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    pub completed: bool,
}

/// Notion database API client.
#[derive(Debug, Clone)]
pub struct NotionClient {
    api_key: String,
    database_id: String,
    client: reqwest::Client,
}

impl NotionClient {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            api_key: credentials.notion_api_key.clone(),
            database_id: credentials.notion_database_id.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Download every dashboard row, following pagination.
    pub async fn fetch_dashboard(&self) -> Result<Vec<DashboardRow>> {
        let url = format!("{NOTION_API_URL}/databases/{}/query", self.database_id);
        let mut rows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = match &cursor {
                Some(cursor) => json!({ "start_cursor": cursor }),
                None => json!({}),
            };
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .header("Notion-Version", NOTION_VERSION)
                .json(&body)
                .send()
                .await
                .context("Notion API request failed")?
                .error_for_status()
                .context("Notion API rejected the dashboard query")?;

            let page: Value = response
                .json()
                .await
                .context("Notion API returned unparseable JSON")?;

            for result in page["results"].as_array().into_iter().flatten() {
                match parse_row(result) {
                    Some(row) => rows.push(row),
                    None => warn!("skipping a dashboard row with missing or malformed fields"),
                }
            }

            if page["has_more"].as_bool().unwrap_or(false) {
                cursor = page["next_cursor"].as_str().map(str::to_owned);
            } else {
                return Ok(rows);
            }
        }
    }
}

fn parse_row(page: &Value) -> Option<DashboardRow> {
    let properties = page.get("properties")?;
    Some(DashboardRow {
        name: text_property(properties.get("Experimental Name")?)?,
        label: text_property(properties.get("Label")?)?,
        start_time: date_property(properties.get("Start Date & Time")?)?,
        stop_time: date_property(properties.get("End Date & Time")?)?,
        completed: properties
            .get("Completed")
            .and_then(|p| p["checkbox"].as_bool())
            .unwrap_or(false),
    })
}

/// Plain text of a title or rich_text property.
fn text_property(property: &Value) -> Option<String> {
    let fragments = property
        .get("title")
        .or_else(|| property.get("rich_text"))?
        .as_array()?;
    let text: String = fragments
        .iter()
        .filter_map(|fragment| fragment["plain_text"].as_str())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn date_property(property: &Value) -> Option<DateTime<Utc>> {
    let start = property["date"]["start"].as_str()?;
    DateTime::parse_from_rfc3339(start)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
