//! Editing session for one task.
//!
//! `SequenceEditor` owns the segment store, selection, trim gesture,
//! parameter resolver and autosave controller, and holds the render
//! controls. Every mutation goes through it so validation, selection
//! pruning and the autosave dirty signature stay in step with the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use shotlist_common::config::EditorDefaults;
use shotlist_common::error::{ShotlistError, ShotlistResult};
use shotlist_sequence_model::{
    RenderParams, RewriteData, RewriteMode, Segment, SegmentId, TaskDetail,
};

use crate::autosave::{AutosaveController, AutosaveState, DEFAULT_DEBOUNCE_MS};
use crate::backend::Backend;
use crate::busy::BusyIndicator;
use crate::patch::{SegmentPatch, StylePatch};
use crate::queue::{
    JobTicket, QueueState, RenderControls, RenderEvent, RenderMode, RenderSubmission,
    SubmitOutcome,
};
use crate::resolver::{ParameterResolver, ResolvedStyle, StyleDraft};
use crate::selection::{ClickModifier, Direction, SelectionState};
use crate::signature::{dirty_signature, Signature};
use crate::store::{InsertAt, SegmentStore, DEFAULT_UNDO_CAPACITY};
use crate::trim::{self, TimelineScale, TrimHandler, TrimResult, TrimSide};
use crate::validation::{validate_sequence, ValidationReport};

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    pub debounce: Duration,
    pub undo_capacity: usize,
    pub preview_count: usize,
    pub pixels_per_second: f64,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            preview_count: 3,
            pixels_per_second: trim::DEFAULT_PIXELS_PER_SECOND,
        }
    }
}

impl From<&EditorDefaults> for EditorOptions {
    fn from(defaults: &EditorDefaults) -> Self {
        Self {
            debounce: Duration::from_millis(defaults.autosave_debounce_ms),
            undo_capacity: defaults.undo_capacity,
            preview_count: defaults.preview_count,
            pixels_per_second: defaults.pixels_per_second,
        }
    }
}

/// Cached assistant output for one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleSuggestion {
    pub mode: RewriteMode,
    pub original: String,
    pub suggestion: String,
}

/// Why timeline gestures (drag, trim, click selection) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditLock {
    #[error("Task is still being generated")]
    DisabledExternally,
    #[error("A {0} render is in progress")]
    Rendering(RenderMode),
}

impl From<EditLock> for ShotlistError {
    fn from(lock: EditLock) -> Self {
        ShotlistError::validation(lock.to_string())
    }
}

/// Why a render cannot be submitted right now.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderBlock {
    #[error("Task is still being generated")]
    DisabledExternally,
    #[error("Sequence is empty")]
    Empty,
    #[error("Sequence has {count} validation issue(s)")]
    Invalid { count: usize },
}

impl From<RenderBlock> for ShotlistError {
    fn from(block: RenderBlock) -> Self {
        ShotlistError::validation(block.to_string())
    }
}

pub struct SequenceEditor {
    backend: Arc<dyn Backend>,
    task_id: String,
    options: EditorOptions,
    store: SegmentStore,
    selection: SelectionState,
    trim: TrimHandler,
    resolver: ParameterResolver,
    autosave: AutosaveController,
    render: RenderControls,
    busy: BusyIndicator,
    audio_duration: Option<f64>,
    fonts: Vec<String>,
    disabled_externally: bool,
    suggestions: HashMap<SegmentId, SubtitleSuggestion>,
}

impl std::fmt::Debug for SequenceEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceEditor")
            .field("task_id", &self.task_id)
            .field("segments", &self.store.len())
            .field("revision", &self.store.revision())
            .field("dirty", &self.autosave.is_dirty())
            .field("disabled_externally", &self.disabled_externally)
            .finish_non_exhaustive()
    }
}

impl SequenceEditor {
    /// Fetch the plan and task, then open a session. Fonts and UI defaults
    /// are optional; thumbnail prewarm runs in the background and its
    /// failures are ignored.
    pub async fn load(
        backend: Arc<dyn Backend>,
        task_id: impl Into<String>,
        options: EditorOptions,
    ) -> ShotlistResult<(Self, mpsc::UnboundedReceiver<RenderEvent>)> {
        let task_id = task_id.into();
        info!(task_id = %task_id, "Loading sequence");

        let (segments, task) =
            tokio::try_join!(backend.fetch_plan(&task_id), backend.fetch_task(&task_id))?;

        let fonts = match backend.list_fonts().await {
            Ok(fonts) => fonts,
            Err(e) => {
                warn!(error = %e, "Font list unavailable");
                Vec::new()
            }
        };
        let ui_font = match backend.ui_config().await {
            Ok(config) => config.ui.font_name,
            Err(e) => {
                warn!(error = %e, "UI defaults unavailable");
                None
            }
        };

        let prewarm_backend = Arc::clone(&backend);
        let prewarm_task = task_id.clone();
        tokio::spawn(async move {
            match prewarm_backend.prewarm_thumbnails(&prewarm_task).await {
                Ok(thumbs) => debug!(count = thumbs.thumbs.len(), "Thumbnails prewarmed"),
                Err(e) => debug!(error = %e, "Thumbnail prewarm failed"),
            }
        });

        let (mut editor, events) = Self::new(backend, task_id, segments, task, ui_font, options)?;
        editor.fonts = fonts;
        Ok((editor, events))
    }

    /// Open a session from already-fetched data. Must be called inside a
    /// tokio runtime; the render worker is spawned here.
    pub fn new(
        backend: Arc<dyn Backend>,
        task_id: impl Into<String>,
        segments: Vec<Segment>,
        task: TaskDetail,
        ui_font: Option<String>,
        options: EditorOptions,
    ) -> ShotlistResult<(Self, mpsc::UnboundedReceiver<RenderEvent>)> {
        let task_id = task_id.into();
        let mut store = SegmentStore::with_undo_capacity(Vec::new(), options.undo_capacity);
        store.replace_all(segments)?;

        let disabled_externally = task.is_processing();
        let mut autosave = AutosaveController::new(options.debounce, dirty_signature(store.segments())?);
        autosave.set_enabled(!disabled_externally);

        let resolver = ParameterResolver::new(task.params.unwrap_or_default(), ui_font);
        let (render, events) = RenderControls::spawn(Arc::clone(&backend), task_id.clone());

        info!(
            task_id = %task_id,
            segments = store.len(),
            audio_duration = ?task.audio_duration,
            disabled_externally,
            "Sequence editor ready"
        );

        let editor = Self {
            backend,
            task_id,
            trim: TrimHandler::new(TimelineScale::new(options.pixels_per_second)),
            options,
            store,
            selection: SelectionState::new(),
            resolver,
            autosave,
            render,
            busy: BusyIndicator::global().clone(),
            audio_duration: task.audio_duration.filter(|d| d.is_finite() && *d > 0.0),
            fonts: Vec::new(),
            disabled_externally,
            suggestions: HashMap::new(),
        };
        Ok((editor, events))
    }

    /// Use a private busy indicator instead of the process-wide one, for
    /// both this session and its render worker.
    pub fn with_busy_indicator(mut self, busy: BusyIndicator) -> Self {
        if let Err(e) = self.render.set_busy_indicator(busy.clone()) {
            warn!(error = %e, "Render worker kept the shared busy indicator");
        }
        self.busy = busy;
        self
    }

    // -- accessors --

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn segments(&self) -> &[Segment] {
        self.store.segments()
    }

    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.store.get(id)
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn resolver(&self) -> &ParameterResolver {
        &self.resolver
    }

    pub fn fonts(&self) -> &[String] {
        &self.fonts
    }

    pub fn audio_duration(&self) -> Option<f64> {
        self.audio_duration
    }

    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    pub fn autosave_state(&self) -> &AutosaveState {
        self.autosave.state()
    }

    pub fn timeline_scale(&self) -> TimelineScale {
        self.trim.scale()
    }

    pub fn set_timeline_scale(&mut self, scale: TimelineScale) {
        self.trim.set_scale(scale);
    }

    pub fn zoom(&mut self, factor: f64) {
        let scale = self.trim.scale().zoom(factor);
        self.trim.set_scale(scale);
    }

    pub fn is_disabled_externally(&self) -> bool {
        self.disabled_externally
    }

    /// Block rendering and autosave while the backend task is busy.
    pub fn set_disabled_externally(&mut self, disabled: bool) {
        self.disabled_externally = disabled;
        self.autosave.set_enabled(!disabled);
    }

    // -- store mutations --

    /// Drag reorder. Refused while the timeline is locked.
    pub fn reorder(&mut self, from: usize, to: usize) -> ShotlistResult<()> {
        self.check_unlocked()?;
        self.store.reorder(from, to)?;
        self.after_mutation()
    }

    /// Move one step up (`-1`) or down (`+1`). Returns `false` at the edges.
    pub fn move_by(&mut self, index: usize, delta: isize) -> ShotlistResult<bool> {
        let moved = self.store.move_by(index, delta)?;
        if moved {
            self.after_mutation()?;
        }
        Ok(moved)
    }

    pub fn patch(&mut self, id: &str, patch: &SegmentPatch) -> ShotlistResult<()> {
        self.store.patch(id, patch)?;
        self.after_mutation()
    }

    pub fn bulk_patch(&mut self, ids: &[SegmentId], patch: &SegmentPatch) -> ShotlistResult<usize> {
        let count = self.store.bulk_patch(ids, patch)?;
        self.after_mutation()?;
        Ok(count)
    }

    pub fn patch_selected(&mut self, patch: &SegmentPatch) -> ShotlistResult<usize> {
        let ids = self.selection.ordered_ids(self.store.segments());
        self.bulk_patch(&ids, patch)
    }

    pub fn remove(&mut self, ids: &[SegmentId]) -> ShotlistResult<usize> {
        let count = self.store.remove(ids)?;
        self.after_mutation()?;
        Ok(count)
    }

    pub fn remove_selected(&mut self) -> ShotlistResult<usize> {
        let ids = self.selection.ordered_ids(self.store.segments());
        if ids.is_empty() {
            return Ok(0);
        }
        self.remove(&ids)
    }

    /// Bring back the most recently removed segment at the tail.
    pub fn restore_last(&mut self) -> ShotlistResult<Option<SegmentId>> {
        let restored = self.store.restore_last();
        if restored.is_some() {
            self.after_mutation()?;
        }
        Ok(restored)
    }

    pub fn insert(&mut self, segment: Segment, at: InsertAt) -> ShotlistResult<()> {
        self.store.insert(segment, at)?;
        self.after_mutation()
    }

    pub fn set_start(&mut self, id: &str, start: f64) -> ShotlistResult<TrimResult> {
        let result = trim::set_start(self.require(id)?, start);
        self.patch(id, &result.to_patch())?;
        Ok(result)
    }

    pub fn set_end(&mut self, id: &str, end: f64) -> ShotlistResult<TrimResult> {
        let result = trim::set_end(self.require(id)?, end);
        self.patch(id, &result.to_patch())?;
        Ok(result)
    }

    pub fn set_duration(&mut self, id: &str, duration: f64) -> ShotlistResult<TrimResult> {
        let result = trim::set_duration(self.require(id)?, duration);
        self.patch(id, &result.to_patch())?;
        Ok(result)
    }

    pub fn replace_material(
        &mut self,
        id: &str,
        material: impl Into<String>,
        source_duration: Option<f64>,
    ) -> ShotlistResult<()> {
        let patch = trim::replace_material(self.require(id)?, material, source_duration);
        self.patch(id, &patch)
    }

    // -- selection --
    //
    // Timeline clicks and keys are ignored while the timeline is locked; each
    // returns whether it was applied.

    pub fn click(&mut self, index: usize, modifier: ClickModifier) -> bool {
        if self.ignored("click") {
            return false;
        }
        self.selection.click(self.store.segments(), index, modifier);
        true
    }

    pub fn toggle_selected(&mut self, id: &str) -> bool {
        if self.ignored("toggle") {
            return false;
        }
        self.selection.toggle(id);
        true
    }

    pub fn select_all(&mut self) -> bool {
        if self.ignored("select all") {
            return false;
        }
        self.selection.select_all(self.store.segments());
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        if self.ignored("clear selection") {
            return false;
        }
        self.selection.clear();
        true
    }

    pub fn navigate(&mut self, direction: Direction) -> bool {
        if self.ignored("navigate") {
            return false;
        }
        self.selection.navigate(self.store.segments(), direction);
        true
    }

    // -- trim gestures --

    /// Start a trim gesture. Refused while the timeline is locked; a gesture
    /// already under way still completes.
    pub fn begin_trim(&mut self, id: &str, side: TrimSide, x: f64) -> ShotlistResult<()> {
        self.check_unlocked()?;
        let segment = self.require(id)?.clone();
        self.trim.pointer_down(&segment, side, x);
        Ok(())
    }

    /// Live update while dragging.
    pub fn trim_to(&mut self, x: f64) -> ShotlistResult<Option<TrimResult>> {
        match self.trim.pointer_move(x) {
            Some((id, result)) => self.apply_trim(&id, result),
            None => Ok(None),
        }
    }

    /// Finish the gesture. The gesture is released even when the final
    /// update fails.
    pub fn end_trim(&mut self, x: f64) -> ShotlistResult<Option<TrimResult>> {
        match self.trim.pointer_up(x) {
            Some((id, result)) => self.apply_trim(&id, result),
            None => Ok(None),
        }
    }

    pub fn cancel_trim(&mut self) {
        self.trim.cancel();
    }

    pub fn is_trimming(&self) -> bool {
        self.trim.is_active()
    }

    fn apply_trim(&mut self, id: &str, result: TrimResult) -> ShotlistResult<Option<TrimResult>> {
        if self.store.get(id).is_none() {
            debug!(segment_id = id, "Trim target vanished");
            return Ok(None);
        }
        self.patch(id, &result.to_patch())?;
        Ok(Some(result))
    }

    // -- validation & render --

    pub fn validation(&self) -> ValidationReport {
        validate_sequence(self.store.segments(), self.audio_duration)
    }

    pub fn render_blocker(&self) -> Option<RenderBlock> {
        if self.disabled_externally {
            return Some(RenderBlock::DisabledExternally);
        }
        if self.store.is_empty() {
            return Some(RenderBlock::Empty);
        }
        let report = self.validation();
        if !report.is_valid() {
            return Some(RenderBlock::Invalid {
                count: report.issues.len() + usize::from(report.audio_excess.is_some()),
            });
        }
        None
    }

    /// Drag, trim and click selection are off while the backend task is
    /// processing or a render is running.
    pub fn edit_lock(&self) -> Option<EditLock> {
        if self.disabled_externally {
            return Some(EditLock::DisabledExternally);
        }
        self.render
            .state()
            .running_mode()
            .map(EditLock::Rendering)
    }

    pub fn can_render(&self) -> bool {
        self.render_blocker().is_none()
    }

    pub fn render_params(&self) -> &RenderParams {
        self.resolver.render_params()
    }

    pub fn set_render_params(&mut self, params: RenderParams) {
        self.resolver.set_render_params(params);
    }

    pub fn reset_render_params(&mut self) {
        self.resolver.reset_render_params();
    }

    pub fn resolve_style(&self, id: &str) -> Option<ResolvedStyle> {
        self.store.get(id).map(|s| self.resolver.resolve_segment(s))
    }

    /// Preview the first `count` segments (default from the options),
    /// clamped to the sequence length.
    pub async fn preview(&self, count: Option<usize>) -> ShotlistResult<SubmitOutcome> {
        self.gate()?;
        let len = self.store.len();
        let count = count.unwrap_or(self.options.preview_count).clamp(1, len);
        let head = self.store.segments()[..count].to_vec();
        self.submit(RenderMode::Preview, head).await
    }

    /// Preview one segment on its own.
    pub async fn preview_segment(&self, id: &str) -> ShotlistResult<SubmitOutcome> {
        self.gate()?;
        let mut segment = self.require(id)?.clone();
        segment.order = 1;
        self.submit(RenderMode::Single, vec![segment]).await
    }

    pub async fn render_full(&self) -> ShotlistResult<SubmitOutcome> {
        self.gate()?;
        self.submit(RenderMode::Full, self.store.segments().to_vec()).await
    }

    pub async fn cancel_render(&self) -> ShotlistResult<bool> {
        self.render.cancel().await
    }

    pub async fn retry_last_failed(&self) -> ShotlistResult<Option<JobTicket>> {
        self.render.retry_last_failed().await
    }

    pub fn render_state(&self) -> QueueState {
        self.render.state()
    }

    pub fn last_preview_url(&self) -> Option<String> {
        self.render.last_preview_url()
    }

    pub fn render_controls(&self) -> &RenderControls {
        &self.render
    }

    fn gate(&self) -> ShotlistResult<()> {
        match self.render_blocker() {
            Some(block) => Err(block.into()),
            None => Ok(()),
        }
    }

    async fn submit(&self, mode: RenderMode, segments: Vec<Segment>) -> ShotlistResult<SubmitOutcome> {
        let submission = RenderSubmission::new(
            mode,
            Arc::new(segments),
            self.resolver.render_params(),
            self.resolver.wire_params()?,
        )?;
        self.render.submit(submission).await
    }

    // -- persistence --

    /// Manual save. Skips the debounce, always sends the current sequence
    /// and surfaces the outcome. Returns whether there were unsaved changes.
    pub async fn save(&mut self) -> ShotlistResult<bool> {
        if self.disabled_externally {
            return Err(RenderBlock::DisabledExternally.into());
        }
        let report = self.validation();
        if !report.is_valid() {
            return Err(ShotlistError::validation(report.messages().join("; ")));
        }
        let was_dirty = self.autosave.is_dirty();
        let _busy = self.busy.acquire("save");
        let signature = dirty_signature(self.store.segments())?;
        let result = self.persist().await;
        self.autosave
            .complete(signature, result.is_ok(), Instant::now());
        match result {
            Ok(()) => {
                info!(
                    task_id = %self.task_id,
                    segments = self.store.len(),
                    was_dirty,
                    "Sequence saved"
                );
                Ok(was_dirty)
            }
            Err(e) => {
                warn!(task_id = %self.task_id, error = %e, "Save failed");
                Err(e)
            }
        }
    }

    /// When the next silent save is due.
    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// Run a silent save if the debounce has elapsed at `now`. Returns the
    /// outcome when a save was attempted.
    pub async fn poll_autosave(&mut self, now: Instant) -> Option<bool> {
        let signature = self.autosave.poll(now)?;
        let result = self.persist().await;
        let ok = result.is_ok();
        match result {
            Ok(()) => debug!(signature = signature.short(), "Autosaved"),
            Err(e) => warn!(error = %e, "Autosave failed, will retry"),
        }
        self.autosave.complete(signature, ok, Instant::now());
        Some(ok)
    }

    /// Sleep until the pending silent save is due and run it. Returns
    /// `None` immediately when nothing is pending.
    pub async fn run_pending_autosave(&mut self) -> Option<bool> {
        let deadline = self.autosave.deadline()?;
        tokio::time::sleep_until(deadline).await;
        self.poll_autosave(Instant::now()).await
    }

    async fn persist(&self) -> ShotlistResult<()> {
        self.backend
            .save_segments(&self.task_id, self.store.segments())
            .await
            .map_err(ShotlistError::from)
    }

    // -- style overrides --

    /// Open a segment for focused editing: core style fields become explicit
    /// values and the panel draft is returned.
    pub fn open_for_editing(&mut self, id: &str) -> ShotlistResult<StyleDraft> {
        let materialized = self.resolver.materialize_core(self.require(id)?);
        if !materialized.is_empty() {
            self.patch(id, &SegmentPatch::new().with_style(materialized))?;
        }
        Ok(self.resolver.draft_for(self.require(id)?))
    }

    /// Apply a panel draft to the given segments.
    pub fn apply_draft(
        &mut self,
        ids: &[SegmentId],
        draft: &StyleDraft,
        advanced_open: bool,
    ) -> ShotlistResult<usize> {
        let patch = SegmentPatch::new().with_style(draft.to_patch(advanced_open));
        self.bulk_patch(ids, &patch)
    }

    pub fn apply_draft_to_selection(
        &mut self,
        draft: &StyleDraft,
        advanced_open: bool,
    ) -> ShotlistResult<usize> {
        let ids = self.selection.ordered_ids(self.store.segments());
        self.apply_draft(&ids, draft, advanced_open)
    }

    pub fn apply_style(&mut self, id: &str, style: StylePatch) -> ShotlistResult<()> {
        self.patch(id, &SegmentPatch::new().with_style(style))
    }

    // -- subtitle assistant --

    pub fn suggestion(&self, id: &str) -> Option<&SubtitleSuggestion> {
        self.suggestions.get(id)
    }

    pub async fn suggest_subtitle(
        &mut self,
        id: &str,
        mode: RewriteMode,
    ) -> ShotlistResult<SubtitleSuggestion> {
        let segment = self.require(id)?.clone();
        let _busy = self.busy.acquire("suggest");
        let data = self
            .backend
            .suggest_subtitle(&self.task_id, &segment, mode)
            .await?;
        let suggestion = SubtitleSuggestion {
            mode,
            original: data.original_text,
            suggestion: data.suggestion,
        };
        debug!(segment_id = id, mode = mode.as_str(), "Subtitle suggestion cached");
        self.suggestions.insert(segment.id, suggestion.clone());
        Ok(suggestion)
    }

    /// Suggest for every selected segment in sequence order. Failures are
    /// collected; the remaining segments are still processed.
    pub async fn suggest_for_selection(
        &mut self,
        mode: RewriteMode,
    ) -> Vec<(SegmentId, ShotlistResult<SubtitleSuggestion>)> {
        let ids = self.selection.ordered_ids(self.store.segments());
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.suggest_subtitle(&id, mode).await;
            if let Err(e) = &result {
                warn!(segment_id = %id, error = %e, "Subtitle suggestion failed");
            }
            results.push((id, result));
        }
        results
    }

    /// Store a suggestion as the segment's live subtitle override. Uses
    /// `text` when given, otherwise the cached suggestion.
    pub async fn apply_suggestion(
        &mut self,
        id: &str,
        mode: RewriteMode,
        text: Option<&str>,
    ) -> ShotlistResult<RewriteData> {
        let segment = self.require(id)?.clone();
        let suggestion = text
            .map(str::to_string)
            .or_else(|| self.suggestions.get(id).map(|s| s.suggestion.clone()))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if suggestion.is_empty() {
            return Err(ShotlistError::validation(format!(
                "No subtitle suggestion for segment {id}"
            )));
        }
        let _busy = self.busy.acquire("rewrite");
        let data = self
            .backend
            .rewrite_subtitle(&self.task_id, &segment, mode, &suggestion, true)
            .await?;
        info!(segment_id = id, version = ?data.version, "Subtitle override applied");
        Ok(data)
    }

    pub async fn revert_subtitle(&mut self, id: &str) -> ShotlistResult<()> {
        self.require(id)?;
        let _busy = self.busy.acquire("revert");
        self.backend.revert_subtitle(&self.task_id, id).await?;
        info!(segment_id = id, "Subtitle override reverted");
        Ok(())
    }

    // -- internals --

    fn require(&self, id: &str) -> ShotlistResult<&Segment> {
        self.store
            .get(id)
            .ok_or_else(|| ShotlistError::store(format!("Unknown segment id: {id}")))
    }

    fn check_unlocked(&self) -> ShotlistResult<()> {
        match self.edit_lock() {
            Some(lock) => Err(lock.into()),
            None => Ok(()),
        }
    }

    fn ignored(&self, action: &'static str) -> bool {
        match self.edit_lock() {
            Some(lock) => {
                debug!(action, reason = %lock, "Timeline input ignored");
                true
            }
            None => false,
        }
    }

    fn after_mutation(&mut self) -> ShotlistResult<()> {
        self.selection.retain_existing(self.store.segments());
        let signature: Signature = dirty_signature(self.store.segments())?;
        self.autosave.observe(signature, Instant::now());
        Ok(())
    }
}
