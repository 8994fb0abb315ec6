use crate::application::ports::RemoteSink;
use crate::domain::value_objects::QueuePayload;
use crate::shared::config::RemoteConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

const CHECK_IN_RPC: &str = "/rest/v1/rpc/create_or_update_checkin";
const ATTENDANCE_TABLE: &str = "/rest/v1/attendance";
const SAVED_PROGRAMS_TABLE: &str = "/rest/v1/saved_programs";
const CHECK_IN_ARGUMENTS: [&str; 6] = [
    "timestamp",
    "dimension",
    "mood_level_1_6",
    "affect_tags",
    "note",
    "local_tz",
];
const ATTENDANCE_COLUMNS: [&str; 5] = ["xid_id", "program_id", "timestamp", "method", "site"];
const MAX_ERROR_BODY_CHARS: usize = 160;

/// Delivers queued actions to a PostgREST (Supabase) endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestRemoteSink {
    client: reqwest::Client,
    base_url: String,
}

impl PostgrestRemoteSink {
    pub fn new(config: &RemoteConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid API key header: {e}")))?;
        let token = config.access_token.as_deref().unwrap_or(&config.api_key);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| AppError::ConfigurationError(format!("Invalid access token: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("prefer", HeaderValue::from_static("return=minimal"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|e| AppError::ConfigurationError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(operation: &str, response: reqwest::Response) -> Result<(), AppError> {
        let status = response.status();
        if status.is_success() {
            debug!(target: "offline::sink", operation, status = status.as_u16(), "remote write accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let preview: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        warn!(target: "offline::sink", operation, status = status.as_u16(), "remote write rejected");
        Err(AppError::Delivery(format!(
            "{operation} returned {}: {preview}",
            status.as_u16()
        )))
    }
}

fn object<'a>(payload: &'a QueuePayload) -> Result<&'a Map<String, Value>, AppError> {
    payload
        .as_json()
        .as_object()
        .ok_or_else(|| AppError::Delivery("Payload is not a JSON object".to_string()))
}

fn required_str<'a>(payload: &'a QueuePayload, field: &str) -> Result<&'a str, AppError> {
    payload
        .str_field(field)
        .ok_or_else(|| AppError::Delivery(format!("Payload is missing {field}")))
}

/// The RPC signature is fixed, so only its arguments are forwarded; missing ones go as null.
fn rpc_arguments(payload: &QueuePayload) -> Result<Value, AppError> {
    let source = object(payload)?;
    let args = CHECK_IN_ARGUMENTS
        .iter()
        .map(|name| {
            (
                format!("p_{name}"),
                source.get(*name).cloned().unwrap_or(Value::Null),
            )
        })
        .collect::<Map<String, Value>>();
    Ok(Value::Object(args))
}

fn attendance_row(payload: &QueuePayload) -> Result<Value, AppError> {
    let source = object(payload)?;
    let row = ATTENDANCE_COLUMNS
        .iter()
        .map(|column| {
            (
                column.to_string(),
                source.get(*column).cloned().unwrap_or(Value::Null),
            )
        })
        .collect::<Map<String, Value>>();
    Ok(Value::Object(row))
}

#[async_trait]
impl RemoteSink for PostgrestRemoteSink {
    async fn upsert_check_in(&self, payload: &QueuePayload) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url(CHECK_IN_RPC))
            .json(&rpc_arguments(payload)?)
            .send()
            .await?;
        Self::check("create_or_update_checkin", response).await
    }

    async fn insert_attendance(&self, payload: &QueuePayload) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url(ATTENDANCE_TABLE))
            .json(&attendance_row(payload)?)
            .send()
            .await?;
        Self::check("insert attendance", response).await
    }

    async fn insert_saved_program(&self, payload: &QueuePayload) -> Result<(), AppError> {
        let row = serde_json::json!({
            "user_id": required_str(payload, "user_id")?,
            "program_id": required_str(payload, "program_id")?,
        });
        let response = self
            .client
            .post(self.url(SAVED_PROGRAMS_TABLE))
            .json(&row)
            .send()
            .await?;
        Self::check("insert saved_programs", response).await
    }

    async fn delete_saved_program(&self, payload: &QueuePayload) -> Result<(), AppError> {
        let user_id = required_str(payload, "user_id")?;
        let program_id = required_str(payload, "program_id")?;
        let response = self
            .client
            .delete(self.url(SAVED_PROGRAMS_TABLE))
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("program_id", format!("eq.{program_id}")),
            ])
            .send()
            .await?;
        Self::check("delete saved_programs", response).await
    }
}
