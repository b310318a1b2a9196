//! Shotlist Sequence Model
//!
//! Defines the core data contracts for shot-list editing:
//! - **Segment:** One ordered cut with timing, transition, and material
//! - **Style:** Per-segment subtitle overrides with an explicit inherit marker
//! - **Params:** Task-level base parameters and resolved render parameters
//! - **Contract:** Request/response envelopes exchanged with the backend
//!
//! All times are in seconds. Segment `order` is 1-based and mirrors the
//! position of the segment in its sequence.

pub mod contract;
pub mod params;
pub mod segment;
pub mod style;

pub use contract::*;
pub use params::*;
pub use segment::*;
pub use style::*;
