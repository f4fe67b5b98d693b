use serde::{
  Deserialize,
  Serialize,
};

/// Boolean policies governing which candidate guides are materialized and how
/// blank lines inherit them. Supplied by the host's configuration layer and
/// never mutated by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LineBehavior {
  /// Require guides on both sides of a blank line: inheritance across the
  /// blank is capped at the smaller of the two neighboring indents.
  pub extend_inwards_only: bool,
  /// Show guides at multiples of the indent size.
  pub visible_aligned: bool,
  /// Show guides at textual indents that are not multiples of the indent
  /// size.
  pub visible_unaligned: bool,
  /// Show a guide at the transition from whitespace to text.
  pub visible_at_text_end: bool,
  /// Copy guides from the previous non-blank line into blank lines.
  pub visible_empty: bool,
  /// Extend guides through a trailing run of blank lines at the end of the
  /// document.
  pub visible_empty_at_end: bool,
}

impl Default for LineBehavior {
  fn default() -> Self {
    Self {
      extend_inwards_only: true,
      visible_aligned: true,
      visible_unaligned: false,
      visible_at_text_end: false,
      visible_empty: true,
      visible_empty_at_end: true,
    }
  }
}
