//! Shotlist Sequence Engine
//!
//! Stateful editing and render orchestration for a shot list.
//!
//! # Data Flow
//!
//! ```text
//! interaction ──► SegmentStore ──► validation
//!                      │
//!                      ├──► dirty signature ──► AutosaveController ──► save
//!                      │
//!                      └──► render signature ──► RenderCache ──┐
//!                                                  (miss)      │
//! ParameterResolver ──► resolved params ──────────────────────┴──► render queue ──► backend
//! ```
//!
//! `SequenceEditor` wires the pieces together for one task; each component
//! is usable on its own.

pub mod autosave;
pub mod backend;
pub mod busy;
pub mod editor;
pub mod patch;
pub mod queue;
pub mod resolver;
pub mod selection;
pub mod signature;
pub mod store;
pub mod trim;
pub mod validation;

pub use autosave::{AutosaveController, AutosaveState};
pub use backend::{Backend, BackendError, HttpBackend};
pub use busy::{BusyGuard, BusyIndicator};
pub use editor::{EditLock, EditorOptions, RenderBlock, SequenceEditor, SubtitleSuggestion};
pub use patch::{SegmentPatch, StylePatch};
pub use queue::{
    JobOutcome, JobStatus, JobTicket, QueueState, RenderControls, RenderEvent, RenderJob,
    RenderMode, RenderSubmission, SubmitOutcome,
};
pub use resolver::{ParameterResolver, ResolvedStyle, StyleDraft};
pub use selection::{ClickModifier, Direction, SelectionState};
pub use signature::{dirty_signature, render_signature, RenderCache, Signature};
pub use store::{InsertAt, SegmentStore, StoreError};
pub use trim::{TimelineScale, TrimHandler, TrimResult, TrimSide};
pub use validation::{validate_sequence, FieldIssue, SegmentField, ValidationReport};
