//! Per-view assembly: resolved profile, analysis handle, caret selector and
//! page-width markers.

use std::sync::Arc;

use ropey::Rope;
use rulers_core::{
  ConfigError,
  DocumentAnalyzer,
  LineSpan,
  Snapshot,
  SpanKey,
};

use crate::{
  caret::{
    CaretPosition,
    CaretSelector,
  },
  config::{
    GuideProfile,
    GuideProfiles,
  },
  handle::GuideHandle,
};

/// Sizes the host editor reports for a view; profiles may override them.
#[derive(Debug, Clone, Copy)]
pub struct HostSizes {
  pub indent_size: u32,
  pub tab_size: u32,
}

/// One editor view's guides: analysis, highlighting and markers behind a
/// renderer-facing surface. The profile is resolved once at construction —
/// there is no global theme state to consult afterwards.
pub struct GuideView {
  profile: GuideProfile,
  handle: Arc<GuideHandle>,
  selector: CaretSelector,
}

impl GuideView {
  pub fn new(
    profiles: &GuideProfiles,
    content_type: Option<&str>,
    sizes: HostSizes,
    doc: &Rope,
    version: u64,
  ) -> Result<Self, ConfigError> {
    let profile = profiles.profile(content_type).clone();
    let indent_size = profile.indent_size.unwrap_or(sizes.indent_size);
    let tab_size = profile.tab_size.unwrap_or(sizes.tab_size);
    let analyzer = DocumentAnalyzer::new(profile.behavior, indent_size, tab_size)?;
    let selector = profile.selector(indent_size);
    let handle = Arc::new(GuideHandle::new(analyzer, doc, version));
    Ok(Self {
      profile,
      handle,
      selector,
    })
  }

  pub fn profile(&self) -> &GuideProfile {
    &self.profile
  }

  /// The shared analysis handle, for wiring into an
  /// [`crate::hook::AnalysisHook`] or polling directly.
  pub fn handle(&self) -> &Arc<GuideHandle> {
    &self.handle
  }

  pub fn snapshot(&self) -> Arc<Snapshot> {
    self.handle.load()
  }

  /// Spans to draw for the visible line range, page-width markers included.
  pub fn visible_spans(&self, first_line: usize, last_line: usize) -> Vec<LineSpan> {
    let snapshot = self.handle.load();
    let mut spans: Vec<LineSpan> = snapshot.get_lines(first_line, last_line).cloned().collect();
    spans.extend(self.page_width_spans());
    spans
  }

  /// Whole-document marker spans from the profile.
  pub fn page_width_spans(&self) -> impl Iterator<Item = LineSpan> + '_ {
    self
      .profile
      .page_width_markers
      .iter()
      .map(|&position| LineSpan::page_width(position))
  }

  /// A marker is emphasized once any line extends past its column.
  pub fn marker_highlighted(&self, marker: &LineSpan) -> bool {
    self.handle.load().longest_line() > marker.indent
  }

  /// Re-evaluate highlighting after a caret move. Returns the keys whose
  /// rendering changed, linked continuations included.
  pub fn update_caret(&mut self, caret: CaretPosition) -> Vec<SpanKey> {
    let snapshot = self.handle.load();
    self.selector.move_caret(caret);
    for (i, span) in snapshot.get_all_lines().enumerate() {
      self.selector.add_line(span, i == 0);
    }
    let modified = self.selector.get_modified();
    expand_links(&snapshot, modified)
  }

  /// Whether a span should render highlighted, following links across
  /// blank-line gaps.
  pub fn is_highlighted(&self, key: &SpanKey) -> bool {
    if self.selector.is_highlighted(key) {
      return true;
    }
    let snapshot = self.handle.load();
    let Some(id) = snapshot.span_id(key) else {
      return false;
    };
    let Some(span) = snapshot.span(id) else {
      return false;
    };
    span.linked.iter().any(|&link| {
      snapshot
        .span(link)
        .is_some_and(|linked| self.selector.is_highlighted(&linked.key()))
    })
  }

  pub fn selector(&self) -> &CaretSelector {
    &self.selector
  }
}

/// Extend a modified set through span links so linked guides re-render too.
fn expand_links(snapshot: &Snapshot, modified: Vec<SpanKey>) -> Vec<SpanKey> {
  let mut out = modified;
  let mut extra: Vec<SpanKey> = Vec::new();
  for key in &out {
    let Some(id) = snapshot.span_id(key) else { continue };
    let Some(span) = snapshot.span(id) else { continue };
    for &link in &span.linked {
      let Some(linked) = snapshot.span(link) else { continue };
      let linked_key = linked.key();
      if !out.contains(&linked_key) && !extra.contains(&linked_key) {
        extra.push(linked_key);
      }
    }
  }
  out.extend(extra);
  out
}
