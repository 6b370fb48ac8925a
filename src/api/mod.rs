//! Client for the BRICK compute API: file uploads, ring tasks, and sessions.
//!
//! The API accepts long-running work (file processing, BLAST, geNomad) with a
//! `202 Accepted` response carrying an opaque task identifier; results are
//! observed by [polling](task::poll) the task result endpoint.

pub mod task;


use crate::ring::genomad::PredictionClass;
use crate::ring::{Ring, RingReference, RingSegment};
use crate::session::{FileConfig, Session, SessionFile};
use crate::utils::parse_env_int;

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use log::info;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default API address of a local compose stack.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

// ----------------------------------------------------------------------------
// Errors
// ----------------------------------------------------------------------------

/// One structured validation error from the backend, addressing a single field.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(default, rename = "type")]
    pub error_type: String,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let location = self
            .loc
            .iter()
            .map(|part| part.to_string().replace('"', ""))
            .join(".");
        match location.is_empty() {
            true => write!(f, "{}", self.msg),
            false => write!(f, "{location}: {}", self.msg),
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors.iter().map(|error| error.to_string()).join("; ")
}

/// Failures surfaced by the API layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or non-2xx response, with the server detail when
    /// present, else the numeric status code.
    #[error("{0}")]
    RequestFailed(String),
    /// Structured per-field validation errors from the backend.
    #[error("validation failed: {}", format_field_errors(.0))]
    ValidationFailed(Vec<FieldError>),
    /// The overall polling deadline elapsed before a terminal task state.
    #[error("task polling timed out after {0} ms")]
    TimedOut(u64),
    /// The response shape did not match any known schema.
    #[error("unrecognized response from the API")]
    Unrecognized,
}

impl ApiError {
    /// Classify an error response by the shape of its `detail` field.
    pub(crate) async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(_) => return ApiError::RequestFailed(status.as_u16().to_string()),
        };

        match body.get("detail") {
            Some(serde_json::Value::String(detail)) => ApiError::RequestFailed(detail.clone()),
            Some(detail @ serde_json::Value::Array(_)) => {
                match serde_json::from_value(detail.clone()) {
                    Ok(errors) => ApiError::ValidationFailed(errors),
                    Err(_) => ApiError::Unrecognized,
                }
            }
            Some(_) => ApiError::Unrecognized,
            None => ApiError::RequestFailed(status.as_u16().to_string()),
        }
    }
}

// ----------------------------------------------------------------------------
// Settings
// ----------------------------------------------------------------------------

/// API address and task polling configuration.
///
/// Read from the environment where deployment configuration lives; numeric
/// values arrive as strings and fall back to defaults with a warning when
/// unparseable.
#[derive(Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub poll: task::PollSettings,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: DEFAULT_API_URL.to_string(),
            poll: task::PollSettings::default(),
        }
    }
}

impl ApiSettings {
    /// Read settings from `BRICK_API_URL`, `BRICK_TASK_TIMEOUT`,
    /// `BRICK_TASK_INTERVAL` and `BRICK_TASK_MAX_INTERVAL` (milliseconds).
    pub fn from_env() -> Self {
        let mut settings = ApiSettings::default();

        if let Ok(url) = std::env::var("BRICK_API_URL") {
            settings.base_url = url;
        }
        if let Ok(timeout) = std::env::var("BRICK_TASK_TIMEOUT") {
            settings.poll.timeout = Duration::from_millis(parse_env_int(
                &timeout,
                task::DEFAULT_TIMEOUT_MS,
                "BRICK_TASK_TIMEOUT",
            ));
        }
        if let Ok(interval) = std::env::var("BRICK_TASK_INTERVAL") {
            settings.poll.interval = Duration::from_millis(parse_env_int(
                &interval,
                task::DEFAULT_INTERVAL_MS,
                "BRICK_TASK_INTERVAL",
            ));
        }
        if let Ok(max_interval) = std::env::var("BRICK_TASK_MAX_INTERVAL") {
            settings.poll.max_interval = Duration::from_millis(parse_env_int(
                &max_interval,
                task::DEFAULT_MAX_INTERVAL_MS,
                "BRICK_TASK_MAX_INTERVAL",
            ));
        }

        settings
    }
}

// ----------------------------------------------------------------------------
// Ring Task Schemas
// ----------------------------------------------------------------------------

/// BLAST comparison methods offered by the backend.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlastMethod {
    Blastn,
}

/// Request a BLAST ring of a session genome against the reference.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BlastRingSchema {
    pub reference: RingReference,
    pub genome_id: String,
    pub blast_method: BlastMethod,
    pub min_identity: f64,
    pub min_alignment: u64,
}

/// Request an annotation ring from an uploaded GenBank or custom TSV file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AnnotationRingSchema {
    pub reference: RingReference,
    pub genbank_id: Option<String>,
    pub tsv_id: Option<String>,
    #[serde(default)]
    pub genbank_features: Vec<String>,
    #[serde(default)]
    pub genbank_qualifiers: Vec<String>,
}

/// Request a label ring from an uploaded TSV file and/or custom labels.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LabelRingSchema {
    pub reference: RingReference,
    pub tsv_id: Option<String>,
    #[serde(default)]
    pub labels: Vec<RingSegment>,
}

/// Request a geNomad classification ring of a session genome.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GenomadRingSchema {
    pub reference: RingReference,
    pub genome_id: String,
    pub window_size: u64,
    pub min_window_score: f64,
    pub prediction_classes: Vec<PredictionClass>,
}

/// Accepted-job response of the submission endpoints.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct SubmitResponse {
    task_id: String,
}

// ----------------------------------------------------------------------------
// Client
// ----------------------------------------------------------------------------

/// Asynchronous client for the BRICK API.
///
/// Submission methods block until the accepted task completes, failing with
/// the [`ApiError`] taxonomy wrapped into a report. Independent submissions
/// may be awaited concurrently; they share no mutable state.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    settings: ApiSettings,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> Self {
        ApiClient {
            client: reqwest::Client::new(),
            settings,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.base_url)
    }

    /// Submit a job request, then poll the task result endpoint until done.
    async fn submit<T>(&self, request: reqwest::RequestBuilder) -> Result<T, Report>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|error| ApiError::RequestFailed(error.to_string()))?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await.into());
        }

        let submitted: SubmitResponse = response.json().await.map_err(|_| ApiError::Unrecognized)?;
        info!("Task accepted: {}", submitted.task_id);

        let status_url = self.url(&format!("/tasks/result/{}", submitted.task_id));
        let outcome = task::poll::<T>(&self.client, &status_url, &self.settings.poll).await?;

        info!(
            "Task {} succeeded after {} status checks",
            outcome.response.task_id,
            outcome.retries + 1
        );
        outcome.response.result.ok_or(ApiError::Unrecognized.into())
    }

    /// Upload a file for validation and processing.
    pub async fn upload_file<P>(&self, path: &P, config: &FileConfig) -> Result<SessionFile, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let content =
            std::fs::read(path.as_ref()).wrap_err(eyre!("Failed to read upload file: {path:?}"))?;
        let form = Form::new()
            .part(
                "file",
                Part::bytes(content).file_name(config.original_filename.clone()),
            )
            .text(
                "config",
                serde_json::to_string(config).wrap_err("Failed to serialize file config")?,
            );

        let request = self.client.post(self.url("/files/upload")).multipart(form);
        self.submit(request).await
    }

    /// Request a BLAST ring computation.
    pub async fn create_blast_ring(&self, schema: &BlastRingSchema) -> Result<Ring, Report> {
        self.submit(self.client.post(self.url("/rings/blast")).json(schema))
            .await
    }

    /// Request an annotation ring computation.
    pub async fn create_annotation_ring(
        &self,
        schema: &AnnotationRingSchema,
    ) -> Result<Ring, Report> {
        self.submit(self.client.post(self.url("/rings/annotation")).json(schema))
            .await
    }

    /// Request a label ring computation.
    pub async fn create_label_ring(&self, schema: &LabelRingSchema) -> Result<Ring, Report> {
        self.submit(self.client.post(self.url("/rings/label")).json(schema))
            .await
    }

    /// Request a geNomad classification ring computation.
    pub async fn create_genomad_ring(&self, schema: &GenomadRingSchema) -> Result<Ring, Report> {
        self.submit(self.client.post(self.url("/rings/genomad")).json(schema))
            .await
    }

    /// Fetch a session with its files and rings.
    pub async fn get_session(&self, session_id: &str) -> Result<Session, Report> {
        let response = self
            .client
            .get(self.url(&format!("/sessions/{session_id}")))
            .send()
            .await
            .map_err(|error| ApiError::RequestFailed(error.to_string()))?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await.into());
        }
        let session = response.json().await.map_err(|_| ApiError::Unrecognized)?;
        Ok(session)
    }

    /// List all known session identifiers.
    pub async fn session_ids(&self) -> Result<Vec<String>, Report> {
        let response = self
            .client
            .get(self.url("/sessions/identifiers"))
            .send()
            .await
            .map_err(|error| ApiError::RequestFailed(error.to_string()))?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await.into());
        }
        let ids = response.json().await.map_err(|_| ApiError::Unrecognized)?;
        Ok(ids)
    }

    /// Delete a session, optionally with its working data on disk.
    pub async fn delete_session(&self, session_id: &str, session_data: bool) -> Result<(), Report> {
        let response = self
            .client
            .delete(self.url(&format!("/sessions/{session_id}")))
            .query(&[("session_data", session_data)])
            .send()
            .await
            .map_err(|error| ApiError::RequestFailed(error.to_string()))?;
        if !response.status().is_success() {
            Err(ApiError::from_response(response).await)?;
        }
        Ok(())
    }
}
