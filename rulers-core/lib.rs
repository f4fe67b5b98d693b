//! Indent-guide analysis over plain line text.
//!
//! This crate is the pure half of the system: given a document snapshot and a
//! [`LineBehavior`] policy it derives the set of vertical guide segments
//! ([`LineSpan`]s) covering the document, both from scratch and incrementally
//! for a bounded edit. It knows nothing about rendering, carets or async —
//! those live in `rulers-view`.

pub mod analyzer;
pub mod behavior;
pub mod metrics;
pub mod span;

pub use analyzer::{
  Cancelled,
  DocumentAnalyzer,
  LineEdit,
  Snapshot,
};
pub use behavior::LineBehavior;
pub use span::{
  FormatIndex,
  LineNr,
  LineSpan,
  LineSpanKind,
  SpanId,
  SpanKey,
};
use thiserror::Error;

/// Configuration failures surfaced to the caller. Never retried; the caller
/// substitutes a safe default (no analysis, or the `none` caret handler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("indent size must be positive, got {0}")]
  IndentSize(u32),
  #[error("tab size must be positive, got {0}")]
  TabSize(u32),
  #[error("unknown caret handler `{0}`")]
  UnknownCaretHandler(String),
}
