//! Incremental derivation of guide [`LineSpan`]s from document text.
//!
//! The analyzer caches one [`LineState`] per document line: its tab-expanded
//! indent, expanded length, blank flag and the guide columns active on it.
//! Blank lines store the columns they inherit from their neighbors. Spans are
//! produced by a vertical merge sweep over the state vector, which makes an
//! incremental [`DocumentAnalyzer::update`] equivalent to a fresh
//! [`DocumentAnalyzer::reset`] by construction: the edit hint only bounds how
//! much text is re-scanned, never which spans come out.

use std::collections::HashMap;

use ropey::RopeSlice;
use smallvec::SmallVec;

use crate::{
  ConfigError,
  behavior::LineBehavior,
  metrics,
  span::{
    LineSpan,
    SpanId,
    SpanKey,
  },
};

/// Lines re-scanned between cooperative cancellation checks.
const CANCEL_CHUNK: usize = 1024;

/// Outcome of a computation superseded by a newer request. Not a failure:
/// the result is discarded and the newer computation publishes instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Edit hint in document line space: lines `first_line..=old_last_line` of
/// the previous document were replaced by `first_line..=new_last_line` of the
/// new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEdit {
  pub first_line: usize,
  pub old_last_line: usize,
  pub new_last_line: usize,
}

impl LineEdit {
  /// Hint covering the whole document.
  pub fn all(old_line_count: usize, new_line_count: usize) -> Self {
    Self {
      first_line: 0,
      old_last_line: old_line_count.saturating_sub(1),
      new_last_line: new_line_count.saturating_sub(1),
    }
  }

  /// Compose with an edit that happened after `self`, producing one hint
  /// relative to the document `self` started from. Over-approximates
  /// conservatively; hints bound work, never correctness.
  pub fn merge(self, later: LineEdit) -> LineEdit {
    let shift = self.new_last_line as i64 - self.old_last_line as i64;
    let first_line = self.first_line.min(later.first_line);
    let old_last_line = (later.old_last_line as i64 - shift).max(self.old_last_line as i64);
    let new_last_line = (self.new_last_line as i64 + later.new_last_line as i64
      - later.old_last_line as i64)
      .max(later.new_last_line as i64);
    LineEdit {
      first_line,
      old_last_line: old_last_line.max(first_line as i64) as usize,
      new_last_line: new_last_line.max(first_line as i64) as usize,
    }
  }
}

/// Cached per-line analysis. Non-blank lines carry their own candidate
/// columns; blank lines carry whatever the inheritance pass gave them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LineState {
  indent: u32,
  length: u32,
  blank: bool,
  columns: SmallVec<[u32; 6]>,
}

/// Derives guide spans for one view's document, given an indentation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAnalyzer {
  behavior: LineBehavior,
  indent_size: u32,
  tab_size: u32,
}

impl DocumentAnalyzer {
  pub fn new(behavior: LineBehavior, indent_size: u32, tab_size: u32) -> Result<Self, ConfigError> {
    if indent_size == 0 {
      return Err(ConfigError::IndentSize(indent_size));
    }
    if tab_size == 0 {
      return Err(ConfigError::TabSize(tab_size));
    }
    Ok(Self {
      behavior,
      indent_size,
      tab_size,
    })
  }

  pub fn behavior(&self) -> &LineBehavior {
    &self.behavior
  }

  pub fn indent_size(&self) -> u32 {
    self.indent_size
  }

  pub fn tab_size(&self) -> u32 {
    self.tab_size
  }

  /// Full recomputation from scratch.
  pub fn reset(
    &self,
    doc: RopeSlice,
    version: u64,
    is_cancelled: impl Fn() -> bool,
  ) -> Result<Snapshot, Cancelled> {
    let line_count = doc.len_lines();
    let mut states = Vec::with_capacity(line_count);
    for (i, line) in doc.lines().enumerate() {
      if i % CANCEL_CHUNK == 0 && is_cancelled() {
        return Err(Cancelled);
      }
      states.push(self.scan_line(line));
    }
    self.inherit_blanks(&mut states, 0, line_count.saturating_sub(1));
    self.finish(states, version, is_cancelled)
  }

  /// Incremental recomputation after an edit. Produces exactly what
  /// [`Self::reset`] would on the new document; only the text scan is
  /// bounded by the hint, widened through adjacent blank runs so blank-line
  /// inheritance that reaches back to the edit is re-derived.
  ///
  /// A hint inconsistent with the documents is dropped and the whole text is
  /// re-scanned instead.
  pub fn update(
    &self,
    previous: &Snapshot,
    doc: RopeSlice,
    edit: LineEdit,
    version: u64,
    is_cancelled: impl Fn() -> bool,
  ) -> Result<Snapshot, Cancelled> {
    let line_count = doc.len_lines();
    let old_count = previous.line_states.len();
    let LineEdit {
      first_line,
      old_last_line,
      new_last_line,
    } = edit;

    let consistent = old_count > 0
      && first_line <= old_last_line
      && first_line <= new_last_line
      && old_last_line < old_count
      && new_last_line < line_count
      && old_count - (old_last_line - first_line) + (new_last_line - first_line) == line_count;
    if !consistent {
      log::debug!(
        "edit hint {edit:?} inconsistent with document ({old_count} -> {line_count} lines), \
         re-scanning everything"
      );
      return self.reset(doc, version, is_cancelled);
    }

    let mut states = Vec::with_capacity(line_count);
    states.extend_from_slice(&previous.line_states[..first_line]);
    let mut lines = doc.lines_at(first_line);
    for i in first_line..=new_last_line {
      if (i - first_line) % CANCEL_CHUNK == 0 && is_cancelled() {
        return Err(Cancelled);
      }
      let Some(line) = lines.next() else { break };
      states.push(self.scan_line(line));
    }
    states.extend_from_slice(&previous.line_states[old_last_line + 1..]);
    debug_assert_eq!(states.len(), line_count);

    // Blank runs touching the edit inherit from lines inside it, so the
    // inheritance pass must cover them too.
    let mut dirty_first = first_line;
    while dirty_first > 0 && states[dirty_first - 1].blank {
      dirty_first -= 1;
    }
    let mut dirty_last = new_last_line.min(line_count - 1);
    while dirty_last + 1 < line_count && states[dirty_last + 1].blank {
      dirty_last += 1;
    }
    self.inherit_blanks(&mut states, dirty_first, dirty_last);
    self.finish(states, version, is_cancelled)
  }

  /// Own candidate columns of a line, ascending.
  fn scan_line(&self, line: RopeSlice) -> LineState {
    let (indent, blank) = metrics::leading_whitespace(line, self.tab_size);
    let length = metrics::actual_length(line, self.tab_size);
    let mut columns = SmallVec::new();
    if !blank && indent > 0 {
      if self.behavior.visible_aligned {
        let mut col = self.indent_size;
        while col <= indent {
          columns.push(col);
          col += self.indent_size;
        }
      }
      let aligned = indent % self.indent_size == 0;
      if !aligned && self.behavior.visible_unaligned {
        columns.push(indent);
      }
      if self.behavior.visible_at_text_end && columns.last() != Some(&indent) {
        columns.push(indent);
      }
    }
    LineState {
      indent,
      length,
      blank,
      columns,
    }
  }

  /// Recompute inherited columns for every blank run intersecting
  /// `from..=to`. Callers guarantee that `from` is either 0 or preceded by a
  /// non-blank line, so each run's upstream neighbor is well defined.
  fn inherit_blanks(&self, states: &mut [LineState], from: usize, to: usize) {
    let behavior = &self.behavior;
    let mut i = from;
    while i <= to && i < states.len() {
      if !states[i].blank {
        i += 1;
        continue;
      }
      let run_start = i;
      let mut run_end = i;
      while run_end + 1 < states.len() && states[run_end + 1].blank {
        run_end += 1;
      }
      debug_assert!(run_start == 0 || !states[run_start - 1].blank);

      let previous = run_start.checked_sub(1);
      let next = (run_end + 1 < states.len()).then_some(run_end + 1);
      let inherited: SmallVec<[u32; 6]> = if !behavior.visible_empty {
        SmallVec::new()
      } else {
        match (previous, next) {
          // nothing above a leading blank run to inherit from
          (None, _) => SmallVec::new(),
          (Some(p), Some(n)) => {
            let source = &states[p];
            if behavior.extend_inwards_only {
              let cap = source.indent.min(states[n].indent);
              source.columns.iter().copied().filter(|&c| c <= cap).collect()
            } else {
              source.columns.clone()
            }
          },
          // trailing run at end of document; no neighbor below to cap it
          (Some(p), None) => {
            if behavior.visible_empty_at_end {
              states[p].columns.clone()
            } else {
              SmallVec::new()
            }
          },
        }
      };
      for line in run_start..=run_end {
        states[line].columns.clone_from(&inherited);
      }
      i = run_end + 1;
    }
  }

  /// Merge sweep: turn the state vector into spans, link spans separated
  /// only by blank lines, and record the longest expanded line.
  fn finish(
    &self,
    states: Vec<LineState>,
    version: u64,
    is_cancelled: impl Fn() -> bool,
  ) -> Result<Snapshot, Cancelled> {
    let mut spans: Vec<LineSpan> = Vec::new();
    // open guides as (column, first line), ascending by column
    let mut open: SmallVec<[(u32, usize); 6]> = SmallVec::new();
    let mut longest_line = 0u32;

    for (i, state) in states.iter().enumerate() {
      if i % CANCEL_CHUNK == 0 && is_cancelled() {
        return Err(Cancelled);
      }
      longest_line = longest_line.max(state.length);

      let mut next_open: SmallVec<[(u32, usize); 6]> = SmallVec::new();
      let mut carried = 0;
      for &col in &state.columns {
        while carried < open.len() && open[carried].0 < col {
          let (closed, first) = open[carried];
          spans.push(LineSpan::new(first, i - 1, closed));
          carried += 1;
        }
        if carried < open.len() && open[carried].0 == col {
          next_open.push(open[carried]);
          carried += 1;
        } else {
          next_open.push((col, i));
        }
      }
      while carried < open.len() {
        let (closed, first) = open[carried];
        spans.push(LineSpan::new(first, i - 1, closed));
        carried += 1;
      }
      open = next_open;
    }
    let last_line = states.len().saturating_sub(1);
    for (col, first) in open {
      spans.push(LineSpan::new(first, last_line, col));
    }

    link_blank_gaps(&states, &mut spans);

    Ok(Snapshot {
      version,
      line_states: states,
      spans,
      longest_line,
    })
  }
}

/// Connect consecutive spans at the same indent whose gap consists purely of
/// blank lines, so highlight can propagate across the gap without merging
/// distinct ranges.
fn link_blank_gaps(states: &[LineState], spans: &mut [LineSpan]) {
  let mut by_indent: HashMap<u32, Vec<SpanId>> = HashMap::new();
  for (id, span) in spans.iter().enumerate() {
    by_indent.entry(span.indent).or_default().push(id as SpanId);
  }

  let mut pairs: Vec<(SpanId, SpanId)> = Vec::new();
  for ids in by_indent.values_mut() {
    ids.sort_by_key(|&id| spans[id as usize].first_line);
    for pair in ids.windows(2) {
      let (a, b) = (pair[0], pair[1]);
      let gap_first = spans[a as usize].last_line as usize + 1;
      let gap_last = spans[b as usize].first_line as usize;
      if states[gap_first..gap_last].iter().all(|state| state.blank) {
        pairs.push((a, b));
      }
    }
  }
  for (a, b) in pairs {
    spans[a as usize].linked.push(b);
    spans[b as usize].linked.push(a);
  }
}

/// Result of one full or incremental analysis pass. Published atomically by
/// the view layer and never mutated afterwards; a reader always observes a
/// complete span set.
#[derive(Debug, Clone)]
pub struct Snapshot {
  version: u64,
  line_states: Vec<LineState>,
  spans: Vec<LineSpan>,
  longest_line: u32,
}

impl Snapshot {
  /// Snapshot with no guides; also the degraded state after a failure.
  pub fn empty(version: u64) -> Self {
    Self {
      version,
      line_states: Vec::new(),
      spans: Vec::new(),
      longest_line: 0,
    }
  }

  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn line_count(&self) -> usize {
    self.line_states.len()
  }

  /// Widest tab-expanded line, for page-width-marker highlighting.
  pub fn longest_line(&self) -> u32 {
    self.longest_line
  }

  pub fn get_all_lines(&self) -> impl Iterator<Item = &LineSpan> {
    self.spans.iter()
  }

  /// Spans intersecting the inclusive line range. An out-of-range request is
  /// clamped to the document rather than rejected.
  pub fn get_lines(&self, first_line: usize, last_line: usize) -> impl Iterator<Item = &LineSpan> {
    let (first_line, last_line) = self.clamp_range(first_line, last_line);
    self
      .spans
      .iter()
      .filter(move |span| span.intersects(first_line, last_line))
  }

  pub fn span(&self, id: SpanId) -> Option<&LineSpan> {
    self.spans.get(id as usize)
  }

  pub fn span_id(&self, key: &SpanKey) -> Option<SpanId> {
    self
      .spans
      .iter()
      .position(|span| span.key() == *key)
      .map(|i| i as SpanId)
  }

  fn clamp_range(&self, first_line: usize, mut last_line: usize) -> (usize, usize) {
    let count = self.line_count();
    if count == 0 {
      return (0, 0);
    }
    if last_line >= count {
      log::debug!("line range {first_line}..={last_line} clamped to {count} lines");
      last_line = count - 1;
    }
    (first_line.min(last_line), last_line)
  }
}
