//! HTTP/JSON backend.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use shotlist_common::config::BackendConfig;
use shotlist_sequence_model::{
    check_envelope, parse_envelope, ConfigData, Envelope, FontsData, PlanData, RenderData,
    RenderRequest, RewriteData, RewriteMode, RewriteRequest, SaveRequest, Segment, SuggestData,
    SuggestRequest, TaskDetail, ThumbsData,
};

use super::{Backend, BackendError};

/// Backend reached over HTTP. `api_base` includes the `/api` prefix; every
/// path below is relative to it.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_base: String,
}

impl HttpBackend {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let api_base = api_base.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::transport(&api_base, e))?;
        Ok(Self { client, api_base })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(
            config.api_base.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        tracing::debug!(path, "GET");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| BackendError::transport(path, e))?;
        let body = read_body(path, response).await?;
        parse_envelope(&body).map_err(|source| BackendError::Contract {
            endpoint: path.to_string(),
            source,
        })
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        tracing::debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::transport(path, e))?;
        let body = read_body(path, response).await?;
        parse_envelope(&body).map_err(|source| BackendError::Contract {
            endpoint: path.to_string(),
            source,
        })
    }
}

/// Read the body, turning non-success statuses into [`BackendError::Status`]
/// with the envelope message when there is one.
async fn read_body(endpoint: &str, response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::transport(endpoint, e))?;
    if status.is_success() {
        return Ok(body);
    }
    let message = serde_json::from_str::<Envelope<Value>>(&body)
        .ok()
        .and_then(|env| env.message)
        .unwrap_or(body);
    Err(BackendError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn fetch_plan(&self, task_id: &str) -> Result<Vec<Segment>, BackendError> {
        let plan: PlanData = self.get(&format!("/v1/tasks/{task_id}/segments")).await?;
        Ok(plan.segments)
    }

    async fn fetch_task(&self, task_id: &str) -> Result<TaskDetail, BackendError> {
        self.get(&format!("/v1/tasks/{task_id}")).await
    }

    async fn save_segments(
        &self,
        task_id: &str,
        segments: &[Segment],
    ) -> Result<(), BackendError> {
        let path = "/v1/segments/save";
        let response = self
            .client
            .post(self.url(path))
            .json(&SaveRequest { task_id, segments })
            .send()
            .await
            .map_err(|e| BackendError::transport(path, e))?;
        let body = read_body(path, response).await?;
        check_envelope(&body).map_err(|source| BackendError::Contract {
            endpoint: path.to_string(),
            source,
        })
    }

    async fn render_segments(
        &self,
        task_id: &str,
        segments: &[Segment],
        params: Option<&Value>,
        preview: bool,
    ) -> Result<RenderData, BackendError> {
        let request = RenderRequest {
            task_id,
            segments,
            params,
            preview,
        };
        self.post("/v1/segments/render", &request).await
    }

    async fn prewarm_thumbnails(&self, task_id: &str) -> Result<ThumbsData, BackendError> {
        self.get(&format!("/v1/tasks/{task_id}/segments/thumbs")).await
    }

    async fn suggest_subtitle(
        &self,
        task_id: &str,
        segment: &Segment,
        mode: RewriteMode,
    ) -> Result<SuggestData, BackendError> {
        let request = SuggestRequest {
            task_id,
            segment_id: &segment.id,
            order: segment.order,
            mode,
        };
        self.post("/v1/subtitles/suggest", &request).await
    }

    async fn rewrite_subtitle(
        &self,
        task_id: &str,
        segment: &Segment,
        mode: RewriteMode,
        suggestion: &str,
        apply: bool,
    ) -> Result<RewriteData, BackendError> {
        let request = RewriteRequest {
            task_id,
            segment_id: &segment.id,
            order: segment.order,
            mode,
            suggestion,
            apply,
        };
        self.post("/v1/subtitles/rewrite", &request).await
    }

    async fn revert_subtitle(&self, task_id: &str, segment_id: &str) -> Result<(), BackendError> {
        let path = "/v1/subtitles/revert";
        let response = self
            .client
            .post(self.url(path))
            .query(&[("task_id", task_id), ("segment_id", segment_id)])
            .send()
            .await
            .map_err(|e| BackendError::transport(path, e))?;
        let body = read_body(path, response).await?;
        check_envelope(&body).map_err(|source| BackendError::Contract {
            endpoint: path.to_string(),
            source,
        })
    }

    async fn list_fonts(&self) -> Result<Vec<String>, BackendError> {
        let fonts: FontsData = self.get("/v1/fonts").await?;
        Ok(fonts.files)
    }

    async fn ui_config(&self) -> Result<ConfigData, BackendError> {
        self.get("/v1/config").await
    }
}
