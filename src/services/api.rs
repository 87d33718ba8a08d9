//! HTTP client for the pill identification backend.
//!
//! All endpoints hang off one configured base address. Wire shapes live in
//! private DTOs here; the rest of the crate only sees the domain models,
//! with every candidate image reference already rewritten to its proxied
//! form.

use std::path::PathBuf;

use base64::Engine;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::candidate::{AnalysisOutcome, CandidateSummary, Page, ResultGroup};
use crate::models::detail::PillDetail;
use crate::models::job::{Job, JobStatus};
use crate::models::query::SearchQuery;
use crate::services::poller::StatusSource;
use crate::services::session::PageSource;

/// Wire markers reported by the status endpoint. Anything else is treated
/// as the explicit failure marker.
const STATUS_PENDING: &str = "PENDING";
const STATUS_SUCCESS: &str = "SUCCESS";

/// Fallbacks for uploads whose handle carries no name or type.
const DEFAULT_UPLOAD_NAME: &str = "photo.jpg";
const DEFAULT_UPLOAD_MIME: &str = "image/jpeg";

/// A locally captured image about to be submitted for analysis.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub path: PathBuf,
    /// Explicit MIME type; sniffed from the bytes when absent.
    pub mime_type: Option<String>,
    /// Explicit upload filename; falls back to the path's, then a default.
    pub file_name: Option<String>,
}

impl CapturedImage {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime_type: None,
            file_name: None,
        }
    }
}

/// Client for the pill identification backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        // Validate the base address once so later request-building cannot
        // fail on it.
        Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base address '{}': {e}", config.base_url)))?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upload a captured image for analysis. Exactly one multipart request
    /// per call; returns the job to poll.
    ///
    /// A missing or unreadable local file is rejected before any network
    /// traffic.
    pub async fn submit_image(&self, image: &CapturedImage) -> Result<Job, ApiError> {
        if image.path.as_os_str().is_empty() {
            return Err(ApiError::MissingImage);
        }

        let bytes = tokio::fs::read(&image.path).await.map_err(|source| {
            ApiError::UnreadableImage {
                path: image.path.display().to_string(),
                source,
            }
        })?;

        let mime = image
            .mime_type
            .clone()
            .or_else(|| sniff_mime(&bytes))
            .unwrap_or_else(|| DEFAULT_UPLOAD_MIME.to_string());

        let file_name = image
            .file_name
            .clone()
            .or_else(|| {
                image
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let body: PredictResponse = self.read_json(response).await?;
        tracing::info!(task_id = %body.task_id, "image submitted for analysis");
        Ok(Job::new(body.task_id))
    }

    /// Fetch the current status of an analysis job.
    pub async fn fetch_status(&self, task_id: &str) -> Result<JobStatus, ApiError> {
        let response = self
            .http
            .get(format!("{}/status/{}", self.base_url, task_id))
            .send()
            .await?;

        let body: StatusResponse = self.read_json(response).await?;
        Ok(match body.status.as_str() {
            STATUS_PENDING => JobStatus::Pending,
            STATUS_SUCCESS => JobStatus::Succeeded,
            other => {
                tracing::debug!(task_id, marker = other, "non-pending status marker");
                JobStatus::Failed
            }
        })
    }

    /// Fetch the grouped result set of a succeeded job: one group per
    /// detected pill, candidates in the server's ranking order. An empty
    /// outer list is the valid "no candidates found" outcome.
    pub async fn fetch_analysis(&self, task_id: &str) -> Result<AnalysisOutcome, ApiError> {
        let response = self
            .http
            .get(format!("{}/result/{}", self.base_url, task_id))
            .send()
            .await?;

        let body: AnalysisResponse = self.read_json(response).await?;

        let processed_image = decode_processed_image(task_id, body.processed_image);
        let groups = body
            .pill_results
            .into_iter()
            .map(|candidates| ResultGroup {
                candidates: candidates
                    .into_iter()
                    .map(|raw| self.candidate_from_raw(raw))
                    .collect(),
            })
            .collect();

        Ok(AnalysisOutcome {
            processed_image,
            groups,
        })
    }

    /// Fetch one page of filter-search results.
    pub async fn fetch_search_page(&self, query: &SearchQuery, page: u32) -> Result<Page, ApiError> {
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(query)
            .query(&[("page", page)])
            .send()
            .await?;

        let body: SearchResponse = self.read_json(response).await?;
        Ok(Page {
            number: page,
            total_pages: body.total_pages.max(1),
            items: body
                .pill_results
                .into_iter()
                .map(|raw| self.candidate_from_raw(raw))
                .collect(),
        })
    }

    /// Fetch the full record for one pill. An unrecognized code answers
    /// with the default (all-empty) record, not an error.
    pub async fn fetch_detail(&self, code: &str) -> Result<PillDetail, ApiError> {
        let response = self
            .http
            .get(format!("{}/detail", self.base_url))
            .query(&[("code", code)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(code, "detail lookup found nothing, using default record");
            return Ok(PillDetail::default());
        }

        let mut detail: PillDetail = self.read_json(response).await?;
        if !detail.image_url.is_empty() {
            detail.image_url = self.proxy_image_url(&detail.image_url);
        }
        Ok(detail)
    }

    /// Fetch the server-side recent lookups, newest first.
    pub async fn fetch_recent(&self) -> Result<Vec<CandidateSummary>, ApiError> {
        let response = self
            .http
            .get(format!("{}/recent", self.base_url))
            .send()
            .await?;

        let body: RecentResponse = self.read_json(response).await?;
        Ok(body
            .pill_results
            .into_iter()
            .map(|raw| self.candidate_from_raw(raw))
            .collect())
    }

    /// Rewrite a backend image URL to its proxied form. Raw URLs are never
    /// handed to consumers; empty references stay empty.
    pub fn proxy_image_url(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        match Url::parse_with_params(&format!("{}/image-proxy", self.base_url), [("url", raw)]) {
            Ok(url) => url.to_string(),
            // Unreachable once the base address validated at construction.
            Err(_) => String::new(),
        }
    }

    fn candidate_from_raw(&self, raw: RawCandidate) -> CandidateSummary {
        CandidateSummary {
            code: raw.code,
            name: raw.pill_info,
            image_url: self.proxy_image_url(&raw.image),
        }
    }

    /// Read a JSON body, turning non-2xx responses into server errors that
    /// prefer the body's `error` field over a generic message.
    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: server_message(status, &body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl StatusSource for ApiClient {
    async fn job_status(&self, task_id: &str) -> Result<JobStatus, ApiError> {
        self.fetch_status(task_id).await
    }
}

impl PageSource for ApiClient {
    async fn fetch_page(&self, query: &SearchQuery, page: u32) -> Result<Page, ApiError> {
        self.fetch_search_page(query, page).await
    }
}

/// Pick the user-facing message for a non-2xx response.
fn server_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.is_empty() => parsed.error,
        _ => format!("server returned HTTP {}", status.as_u16()),
    }
}

/// Sniff the MIME type from the payload's magic bytes.
fn sniff_mime(bytes: &[u8]) -> Option<String> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Decode the annotated source image. A missing or corrupt payload is not
/// fatal to result retrieval; it degrades to no image.
fn decode_processed_image(task_id: &str, encoded: Option<String>) -> Vec<u8> {
    match encoded {
        Some(encoded) if !encoded.is_empty() => {
            match base64::engine::general_purpose::STANDARD.decode(encoded.as_bytes()) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(task_id, error = %err, "processed image was not valid base64");
                    Vec::new()
                }
            }
        }
        _ => Vec::new(),
    }
}

// ── Wire shapes ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PredictResponse {
    task_id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[allow(dead_code)]
    #[serde(default)]
    task_id: String,
    status: String,
}

#[derive(Deserialize)]
struct RawCandidate {
    #[serde(default)]
    code: String,
    #[serde(default)]
    pill_info: String,
    #[serde(default)]
    image: String,
}

#[derive(Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    processed_image: Option<String>,
    #[serde(default)]
    pill_results: Vec<Vec<RawCandidate>>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pill_results: Vec<RawCandidate>,
    #[serde(default = "default_total_pages")]
    total_pages: u32,
}

fn default_total_pages() -> u32 {
    1
}

#[derive(Deserialize)]
struct RecentResponse {
    #[serde(default)]
    pill_results: Vec<RawCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ApiClient {
        ApiClient::new(&AppConfig {
            base_url: "http://pills.test".to_string(),
            http_timeout_secs: 10,
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_base_address() {
        let result = ApiClient::new(&AppConfig {
            base_url: "not a url".to_string(),
            http_timeout_secs: 10,
        });
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_server_message_prefers_error_field() {
        let msg = server_message(StatusCode::BAD_REQUEST, r#"{"error": "no file field"}"#);
        assert_eq!(msg, "no file field");
    }

    #[test]
    fn test_server_message_generic_fallback() {
        assert_eq!(
            server_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>"),
            "server returned HTTP 500"
        );
        assert_eq!(
            server_message(StatusCode::BAD_GATEWAY, r#"{"error": ""}"#),
            "server returned HTTP 502"
        );
    }

    #[test]
    fn test_proxy_url_round_trips_original() {
        let client = test_client();
        let original = "https://health.kr/images/drug_info/002200A101560.jpg?v=2";
        let wrapped = client.proxy_image_url(original);

        let parsed = Url::parse(&wrapped).unwrap();
        assert_eq!(parsed.path(), "/image-proxy");
        let (_, decoded) = parsed
            .query_pairs()
            .find(|(k, _)| k == "url")
            .expect("url parameter present");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_proxy_url_empty_reference_stays_empty() {
        assert_eq!(test_client().proxy_image_url(""), "");
    }

    #[test]
    fn test_candidate_mapping_defaults_missing_fields() {
        let client = test_client();
        let raw: RawCandidate = serde_json::from_str(r#"{"code": "A"}"#).unwrap();
        let candidate = client.candidate_from_raw(raw);
        assert_eq!(candidate.code, "A");
        assert_eq!(candidate.name, "");
        assert_eq!(candidate.image_url, "");
    }

    #[test]
    fn test_grouped_response_keeps_empty_groups() {
        let client = test_client();
        let body: AnalysisResponse = serde_json::from_str(
            r#"{"pill_results": [[{"code": "A", "pill_info": "타이레놀정", "image": "http://img/a.jpg"}], []]}"#,
        )
        .unwrap();

        let groups: Vec<ResultGroup> = body
            .pill_results
            .into_iter()
            .map(|candidates| ResultGroup {
                candidates: candidates
                    .into_iter()
                    .map(|raw| client.candidate_from_raw(raw))
                    .collect(),
            })
            .collect();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].representative().unwrap().code, "A");
        assert!(groups[0].representative().unwrap().image_url.contains("image-proxy"));
        assert!(groups[1].is_empty());
        assert!(groups[1].representative().is_none());
    }

    #[test]
    fn test_search_response_defaults() {
        let body: SearchResponse = serde_json::from_str(r#"{"pill_results": []}"#).unwrap();
        assert_eq!(body.total_pages, 1);
        assert!(body.pill_results.is_empty());
    }

    #[test]
    fn test_processed_image_decodes_or_degrades() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"annotated");
        assert_eq!(
            decode_processed_image("t", Some(encoded)),
            b"annotated".to_vec()
        );
        assert!(decode_processed_image("t", Some("%%not-base64%%".to_string())).is_empty());
        assert!(decode_processed_image("t", Some(String::new())).is_empty());
        assert!(decode_processed_image("t", None).is_empty());
    }

    #[test]
    fn test_sniff_mime_recognizes_png() {
        let png_magic = [0x89u8, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(sniff_mime(&png_magic), Some("image/png".to_string()));
        assert_eq!(sniff_mime(b"not an image"), None);
    }
}
