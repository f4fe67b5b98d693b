//! Caret-driven guide highlighting.
//!
//! A selector is fed every span of the current snapshot once per evaluation
//! pass (one pass per caret move or view refresh) and decides which guides
//! to highlight for the caret's position. [`CaretSelector::get_modified`]
//! then yields exactly the spans whose highlight flag changed against the
//! previous pass, so the renderer touches only what moved.

use std::{
  collections::HashSet,
  str::FromStr,
};

use rulers_core::{
  ConfigError,
  span::{
    LineSpan,
    LineSpanKind,
    SpanKey,
  },
};
use serde::{
  Deserialize,
  Serialize,
};

/// Caret location in document space. `column` is the tab-expanded virtual
/// column, including virtual space past the end of line; see
/// `rulers_core::metrics::virtual_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretPosition {
  pub line: usize,
  pub column: u32,
}

/// Policy for a caret sitting exactly on a guide column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnColumn {
  /// Keep the guide directly under the caret highlighted.
  #[default]
  Keep,
  /// Treat the caret as right of its guide and highlight the next one left.
  StepLeft,
}

/// The highlight strategies. Resolved from configuration by stable name;
/// unknown names are a [`ConfigError`] and callers fall back to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaretHandlerKind {
  None,
  NearestLeft,
  NearestLeft2,
  Adjacent,
  AboveBelowEnds,
}

impl CaretHandlerKind {
  pub const ALL: [CaretHandlerKind; 5] = [
    CaretHandlerKind::None,
    CaretHandlerKind::NearestLeft,
    CaretHandlerKind::NearestLeft2,
    CaretHandlerKind::Adjacent,
    CaretHandlerKind::AboveBelowEnds,
  ];

  /// Stable configuration name.
  pub fn name(self) -> &'static str {
    match self {
      Self::None => "none",
      Self::NearestLeft => "nearest-left",
      Self::NearestLeft2 => "nearest-left-2",
      Self::Adjacent => "adjacent",
      Self::AboveBelowEnds => "above-below-ends",
    }
  }

  /// Human-readable name for host option pages.
  pub fn display_name(self) -> &'static str {
    match self {
      Self::None => "No highlight",
      Self::NearestLeft => "Nearest guide left of the caret",
      Self::NearestLeft2 => "Nearest guide, including adjacent blocks",
      Self::Adjacent => "Guides one indent level around the caret",
      Self::AboveBelowEnds => "Enclosing indentation scope",
    }
  }

  pub fn documentation(self) -> &'static str {
    match self {
      Self::None => "Never highlights any guide.",
      Self::NearestLeft => {
        "Highlights the single guide covering the caret's line at the \
         deepest indent left of the caret column."
      },
      Self::NearestLeft2 => {
        "Like the nearest-left handler, but also considers guides ending \
         one line above or below the caret."
      },
      Self::Adjacent => {
        "Highlights every guide on the caret's line at the caret column or \
         exactly one indent level to either side."
      },
      Self::AboveBelowEnds => {
        "Highlights the innermost guide enclosing the caret's line, \
         regardless of the caret column."
      },
    }
  }

  /// Ordering for host option pages.
  pub fn sort_order(self) -> u32 {
    match self {
      Self::None => 0,
      Self::NearestLeft => 10,
      Self::NearestLeft2 => 20,
      Self::Adjacent => 30,
      Self::AboveBelowEnds => 40,
    }
  }

  pub fn from_name(name: &str) -> Result<Self, ConfigError> {
    Self::ALL
      .iter()
      .copied()
      .find(|kind| kind.name() == name)
      .ok_or_else(|| ConfigError::UnknownCaretHandler(name.to_string()))
  }

  pub fn selector(self, indent_size: u32, on_column: OnColumn) -> CaretSelector {
    CaretSelector::new(self, indent_size, on_column)
  }
}

impl FromStr for CaretHandlerKind {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_name(s)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassState {
  Idle,
  Evaluating,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
  key: SpanKey,
  /// False when the span was admitted by NearestLeft2's adjacency rule only.
  covers: bool,
}

/// Stateful highlight selector for one view.
///
/// Per pass: [`Self::move_caret`], then [`Self::add_line`] for each span
/// (`new_pass` on the first), then [`Self::get_modified`] to drain the
/// changes. The only state kept across passes is the previous highlight
/// assignment, for diffing.
#[derive(Debug)]
pub struct CaretSelector {
  kind: CaretHandlerKind,
  indent_size: u32,
  on_column: OnColumn,
  caret: CaretPosition,
  state: PassState,
  pending_pass: bool,
  best: Option<Candidate>,
  matched: Vec<SpanKey>,
  highlighted: HashSet<SpanKey>,
}

impl CaretSelector {
  pub fn new(kind: CaretHandlerKind, indent_size: u32, on_column: OnColumn) -> Self {
    Self {
      kind,
      indent_size,
      on_column,
      caret: CaretPosition::default(),
      state: PassState::Idle,
      pending_pass: false,
      best: None,
      matched: Vec::new(),
      highlighted: HashSet::new(),
    }
  }

  pub fn kind(&self) -> CaretHandlerKind {
    self.kind
  }

  /// Record a caret move; the next evaluation pass uses this position.
  pub fn move_caret(&mut self, caret: CaretPosition) {
    self.caret = caret;
    self.pending_pass = true;
  }

  /// Feed one span of the current pass. `new_pass` restarts accumulation;
  /// callers pass it on the first span of a pass.
  pub fn add_line(&mut self, span: &LineSpan, new_pass: bool) {
    if new_pass || self.pending_pass || self.state == PassState::Idle {
      self.begin_pass();
    }
    // markers are highlighted from the longest line, not the caret
    if span.kind != LineSpanKind::Normal {
      return;
    }

    let covers = span.contains_line(self.caret.line);
    match self.kind {
      CaretHandlerKind::None => {},
      CaretHandlerKind::NearestLeft | CaretHandlerKind::NearestLeft2 => {
        let admit = covers
          || (self.kind == CaretHandlerKind::NearestLeft2 && adjacent_to(span, self.caret.line));
        if !admit || !self.left_of_caret(span.indent) {
          return;
        }
        let candidate = Candidate {
          key: span.key(),
          covers,
        };
        if self.improves_on_best(&candidate) {
          self.best = Some(candidate);
        }
      },
      CaretHandlerKind::Adjacent => {
        let column = self.caret.column;
        let step = self.indent_size;
        let banded = span.indent == column
          || span.indent.saturating_add(step) == column
          || column.saturating_add(step) == span.indent;
        if covers && banded {
          self.matched.push(span.key());
        }
      },
      CaretHandlerKind::AboveBelowEnds => {
        if !covers {
          return;
        }
        let candidate = Candidate {
          key: span.key(),
          covers,
        };
        if self.improves_on_best(&candidate) {
          self.best = Some(candidate);
        }
      },
    }
  }

  /// Spans whose highlight flag changed since the previous pass, ascending
  /// by key. Draining ends the pass and resets modified tracking.
  pub fn get_modified(&mut self) -> Vec<SpanKey> {
    if self.state == PassState::Idle && !self.pending_pass {
      return Vec::new();
    }
    let next: HashSet<SpanKey> = match self.kind {
      CaretHandlerKind::None => HashSet::new(),
      CaretHandlerKind::Adjacent => self.matched.drain(..).collect(),
      CaretHandlerKind::NearestLeft
      | CaretHandlerKind::NearestLeft2
      | CaretHandlerKind::AboveBelowEnds => self.best.take().map(|c| c.key).into_iter().collect(),
    };
    let mut modified: Vec<SpanKey> = self.highlighted.symmetric_difference(&next).copied().collect();
    modified.sort_unstable();
    self.highlighted = next;
    self.state = PassState::Idle;
    self.pending_pass = false;
    modified
  }

  pub fn is_highlighted(&self, key: &SpanKey) -> bool {
    self.highlighted.contains(key)
  }

  pub fn highlighted(&self) -> impl Iterator<Item = &SpanKey> {
    self.highlighted.iter()
  }

  fn begin_pass(&mut self) {
    self.state = PassState::Evaluating;
    self.pending_pass = false;
    self.best = None;
    self.matched.clear();
  }

  fn left_of_caret(&self, indent: u32) -> bool {
    match self.on_column {
      OnColumn::Keep => indent <= self.caret.column,
      OnColumn::StepLeft => indent < self.caret.column,
    }
  }

  /// Deeper wins; at equal depth the covering span beats an adjacent one,
  /// then the later range, so the result never depends on input order.
  fn improves_on_best(&self, candidate: &Candidate) -> bool {
    let Some(best) = &self.best else { return true };
    (candidate.key.indent, candidate.covers, candidate.key.first_line)
      > (best.key.indent, best.covers, best.key.first_line)
  }
}

fn adjacent_to(span: &LineSpan, line: usize) -> bool {
  let line = line as i64;
  line + 1 == span.first_line as i64 || line - 1 == span.last_line as i64
}
