#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use shotlist_sequence_engine::backend::{Backend, BackendError};
use shotlist_sequence_model::{
    parse_envelope, ConfigData, PlanData, RenderData, RewriteData, RewriteMode, Segment,
    SuggestData, TaskDetail, ThumbsData, UiConfig,
};

/// A render request held open until the test answers it.
pub struct PendingRender {
    pub index: usize,
    pub segments: Vec<Segment>,
    pub params: Option<Value>,
    pub preview: bool,
    respond: oneshot::Sender<Result<RenderData, BackendError>>,
}

impl PendingRender {
    pub fn succeed(self, url: &str) {
        let data = if self.preview {
            RenderData {
                combined_video: Some(url.to_string()),
                ..RenderData::default()
            }
        } else {
            RenderData {
                final_video: Some(url.to_string()),
                ..RenderData::default()
            }
        };
        let _ = self.respond.send(Ok(data));
    }

    pub fn fail(self, message: &str) {
        let _ = self
            .respond
            .send(Err(BackendError::transport("/v1/segments/render", message)));
    }

    pub fn respond(self, data: RenderData) {
        let _ = self.respond.send(Ok(data));
    }

    /// True once the queue dropped the request future.
    pub fn is_abandoned(&self) -> bool {
        self.respond.is_closed()
    }
}

/// In-memory backend with call counters. Renders either complete at once
/// or are handed to the test through [`MockBackend::gated`].
#[derive(Default)]
pub struct MockBackend {
    pub plan: Vec<Segment>,
    pub task: TaskDetail,
    pub render_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub suggest_calls: AtomicUsize,
    pub saved: Mutex<Vec<Vec<Segment>>>,
    pub rewrites: Mutex<Vec<(String, String)>>,
    pub reverts: Mutex<Vec<String>>,
    save_failures: Mutex<VecDeque<String>>,
    gate: Option<mpsc::UnboundedSender<PendingRender>>,
}

impl MockBackend {
    pub fn new(plan: Vec<Segment>, task: TaskDetail) -> Self {
        Self {
            plan,
            task,
            ..Self::default()
        }
    }

    /// Renders wait for the test to answer through the returned receiver.
    pub fn gated(plan: Vec<Segment>, task: TaskDetail) -> (Self, mpsc::UnboundedReceiver<PendingRender>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Self {
            gate: Some(tx),
            ..Self::new(plan, task)
        };
        (backend, rx)
    }

    pub fn fail_next_save(&self, message: &str) {
        self.save_failures
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    pub fn renders(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn fetch_plan(&self, _task_id: &str) -> Result<Vec<Segment>, BackendError> {
        Ok(self.plan.clone())
    }

    async fn fetch_task(&self, _task_id: &str) -> Result<TaskDetail, BackendError> {
        Ok(self.task.clone())
    }

    async fn save_segments(&self, _task_id: &str, segments: &[Segment]) -> Result<(), BackendError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.save_failures.lock().unwrap().pop_front() {
            return Err(BackendError::transport("/v1/segments/save", message));
        }
        self.saved.lock().unwrap().push(segments.to_vec());
        Ok(())
    }

    async fn render_segments(
        &self,
        _task_id: &str,
        segments: &[Segment],
        params: Option<&Value>,
        preview: bool,
    ) -> Result<RenderData, BackendError> {
        let index = self.render_calls.fetch_add(1, Ordering::SeqCst);
        let Some(gate) = &self.gate else {
            let url = format!("https://cdn.test/render-{index}.mp4");
            return Ok(if preview {
                RenderData {
                    combined_video: Some(url),
                    ..RenderData::default()
                }
            } else {
                RenderData {
                    final_video: Some(url),
                    ..RenderData::default()
                }
            });
        };
        let (respond, rx) = oneshot::channel();
        let pending = PendingRender {
            index,
            segments: segments.to_vec(),
            params: params.cloned(),
            preview,
            respond,
        };
        if gate.send(pending).is_err() {
            return Err(BackendError::transport("/v1/segments/render", "gate closed"));
        }
        rx.await
            .unwrap_or_else(|_| Err(BackendError::transport("/v1/segments/render", "gate dropped")))
    }

    async fn prewarm_thumbnails(&self, _task_id: &str) -> Result<ThumbsData, BackendError> {
        Ok(ThumbsData::default())
    }

    async fn suggest_subtitle(
        &self,
        _task_id: &str,
        segment: &Segment,
        _mode: RewriteMode,
    ) -> Result<SuggestData, BackendError> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        if segment.id == "broken" {
            return Err(BackendError::transport("/v1/subtitles/suggest", "upstream timeout"));
        }
        Ok(SuggestData {
            segment_id: Some(segment.id.clone()),
            original_text: format!("original {}", segment.id),
            suggestion: format!("better {}", segment.id),
        })
    }

    async fn rewrite_subtitle(
        &self,
        _task_id: &str,
        segment: &Segment,
        _mode: RewriteMode,
        suggestion: &str,
        apply: bool,
    ) -> Result<RewriteData, BackendError> {
        self.rewrites
            .lock()
            .unwrap()
            .push((segment.id.clone(), suggestion.to_string()));
        Ok(RewriteData {
            segment_id: Some(segment.id.clone()),
            version: Some("v2".into()),
            applied: apply,
        })
    }

    async fn revert_subtitle(&self, _task_id: &str, segment_id: &str) -> Result<(), BackendError> {
        self.reverts.lock().unwrap().push(segment_id.to_string());
        Ok(())
    }

    async fn list_fonts(&self) -> Result<Vec<String>, BackendError> {
        Ok(vec!["STHeitiMedium.ttc".into(), "MicrosoftYaHeiBold.ttc".into()])
    }

    async fn ui_config(&self) -> Result<ConfigData, BackendError> {
        Ok(ConfigData {
            ui: UiConfig {
                font_name: Some("MicrosoftYaHeiBold.ttc".into()),
            },
        })
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join(name)
}

/// Segments of the sample plan fixture.
pub fn load_fixture_plan() -> Vec<Segment> {
    let content =
        std::fs::read_to_string(fixture_path("sample-plan.json")).expect("fixture should be readable");
    let plan: PlanData = parse_envelope(&content).expect("fixture should parse");
    plan.segments
}

/// Task snapshot of the sample plan fixture.
pub fn load_fixture_task() -> TaskDetail {
    let content =
        std::fs::read_to_string(fixture_path("sample-task.json")).expect("fixture should be readable");
    parse_envelope(&content).expect("fixture should parse")
}

pub fn segments(durations: &[f64]) -> Vec<Segment> {
    durations
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let mut s = Segment::new(format!("seg-{}", i + 1), *d);
            s.order = i as u32 + 1;
            s
        })
        .collect()
}

pub fn shared(backend: MockBackend) -> (Arc<MockBackend>, Arc<dyn Backend>) {
    let concrete = Arc::new(backend);
    let dynamic: Arc<dyn Backend> = concrete.clone();
    (concrete, dynamic)
}
