//! The analyzer's unit of output: a vertical guide segment.

use std::hash::{
  Hash,
  Hasher,
};

use smallvec::SmallVec;

/// Line numbers as stored on a span. Regular spans use 0-based document
/// lines; the `MIN`/`MAX` sentinels mark a span that conceptually covers the
/// whole document (page-width markers).
pub type LineNr = i32;

/// Index of a span in its snapshot's arena. Links between spans are sets of
/// these, never references, so continuation chains cannot form cycles of
/// ownership.
pub type SpanId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LineSpanKind {
  Normal,
  PageWidthMarker,
}

/// Style bucket the renderer uses to pick a format for a guide. Assigned
/// here, interpreted only downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatIndex {
  /// `indent / indent_size` for guides sitting on an indent level.
  Aligned(u32),
  /// Reserved bucket for guides between indent levels.
  Unaligned,
}

impl FormatIndex {
  pub fn new(indent: u32, indent_size: u32) -> Self {
    if indent % indent_size == 0 {
      Self::Aligned(indent / indent_size)
    } else {
      Self::Unaligned
    }
  }
}

/// A guide segment spanning an inclusive line range at one indent column.
///
/// Identity — equality and hashing — is the (first_line, last_line, indent,
/// kind) tuple, so spans can key renderer state across recomputations.
/// `linked` carries arena indices of spans continuing this one across blank
/// gaps and does not participate in identity.
#[derive(Debug, Clone)]
pub struct LineSpan {
  pub first_line: LineNr,
  pub last_line: LineNr,
  pub indent: u32,
  pub kind: LineSpanKind,
  pub linked: SmallVec<[SpanId; 2]>,
}

impl LineSpan {
  pub fn new(first_line: usize, last_line: usize, indent: u32) -> Self {
    debug_assert!(first_line <= last_line);
    Self {
      first_line: first_line as LineNr,
      last_line: last_line as LineNr,
      indent,
      kind: LineSpanKind::Normal,
      linked: SmallVec::new(),
    }
  }

  /// A marker at `position` covering the whole document.
  pub fn page_width(position: u32) -> Self {
    Self {
      first_line: LineNr::MIN,
      last_line: LineNr::MAX,
      indent: position,
      kind: LineSpanKind::PageWidthMarker,
      linked: SmallVec::new(),
    }
  }

  pub fn key(&self) -> SpanKey {
    SpanKey {
      first_line: self.first_line,
      last_line: self.last_line,
      indent: self.indent,
      kind: self.kind,
    }
  }

  pub fn contains_line(&self, line: usize) -> bool {
    let line = line as i64;
    self.first_line as i64 <= line && line <= self.last_line as i64
  }

  /// Whether the span intersects the inclusive line range.
  pub fn intersects(&self, first_line: usize, last_line: usize) -> bool {
    self.first_line as i64 <= last_line as i64 && self.last_line as i64 >= first_line as i64
  }

  pub fn format_index(&self, indent_size: u32) -> FormatIndex {
    FormatIndex::new(self.indent, indent_size)
  }
}

impl PartialEq for LineSpan {
  fn eq(&self, other: &Self) -> bool {
    self.key() == other.key()
  }
}

impl Eq for LineSpan {}

impl Hash for LineSpan {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.key().hash(state);
  }
}

/// Identity of a span, used to correlate spans across snapshots and to diff
/// highlight state between caret passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanKey {
  pub first_line: LineNr,
  pub last_line: LineNr,
  pub indent: u32,
  pub kind: LineSpanKind,
}
