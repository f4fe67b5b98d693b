//! End-to-end: edits flow through the handle (and the debounced hook) into
//! published snapshots, and caret moves drive highlight updates.

use std::{
  sync::Arc,
  time::Duration,
};

use ropey::Rope;
use rulers_core::{
  DocumentAnalyzer,
  LineBehavior,
  LineEdit,
  LineSpan,
  metrics,
};
use rulers_view::{
  AnalysisEvent,
  AnalysisHook,
  CaretPosition,
  GuideHandle,
  GuideProfiles,
  GuideView,
  HostSizes,
};

fn sizes() -> HostSizes {
  HostSizes {
    indent_size: 4,
    tab_size: 4,
  }
}

#[test]
fn edit_poll_caret_roundtrip() {
  let doc = Rope::from_str("def f():\n    x = 1");
  let mut view =
    GuideView::new(&GuideProfiles::default(), Some("python"), sizes(), &doc, 0).unwrap();
  assert_eq!(view.snapshot().get_all_lines().count(), 1);

  // indent a new block under the first one
  let doc = Rope::from_str("def f():\n    x = 1\n    if x:\n        y");
  view.handle().update_document(
    doc.clone(),
    1,
    LineEdit {
      first_line: 1,
      old_last_line: 1,
      new_last_line: 3,
    },
  );
  assert!(view.handle().poll());

  let snapshot = view.snapshot();
  assert_eq!(snapshot.version(), 1);
  let mut keys: Vec<_> = snapshot.get_all_lines().map(LineSpan::key).collect();
  keys.sort_unstable();
  assert_eq!(
    keys,
    vec![LineSpan::new(1, 3, 4).key(), LineSpan::new(3, 3, 8).key()]
  );

  // caret into the inner block, then back out
  let column = metrics::virtual_column(doc.line(3), 8, 0, 4);
  let modified = view.update_caret(CaretPosition { line: 3, column });
  assert_eq!(modified, vec![LineSpan::new(3, 3, 8).key()]);

  let modified = view.update_caret(CaretPosition { line: 1, column: 4 });
  assert_eq!(modified.len(), 2);
  assert!(view.is_highlighted(&LineSpan::new(1, 3, 4).key()));
}

#[test]
fn profile_overrides_apply_per_content_type() {
  let profiles = GuideProfiles::from_toml(
    r#"
      [content-types.make]
      indent-size = 8

      [content-types.make.behavior]
      visible-empty = false
    "#,
  )
  .unwrap();

  let doc = Rope::from_str("\ta\n\n\tb");
  let view = GuideView::new(
    &profiles,
    Some("make"),
    HostSizes {
      indent_size: 4,
      tab_size: 8,
    },
    &doc,
    0,
  )
  .unwrap();

  let snapshot = view.snapshot();
  let mut keys: Vec<_> = snapshot.get_all_lines().map(LineSpan::key).collect();
  keys.sort_unstable();
  // tab-indented lines at one 8-column level; the blank splits the guide
  // into two linked spans
  assert_eq!(
    keys,
    vec![LineSpan::new(0, 0, 8).key(), LineSpan::new(2, 2, 8).key()]
  );
}

#[tokio::test(start_paused = true)]
async fn debounced_hook_publishes_once_idle() {
  let analyzer = DocumentAnalyzer::new(LineBehavior::default(), 4, 4).unwrap();
  let handle = Arc::new(GuideHandle::new(analyzer, &Rope::from_str(""), 0));
  let tx = AnalysisHook::new(Arc::clone(&handle)).spawn();

  let revisions = ["    a", "    a\n    b", "    a\n    b\n        c"];
  for (i, text) in revisions.into_iter().enumerate() {
    tx.send(AnalysisEvent::Reset {
      doc: Rope::from_str(text),
      version: i as u64 + 1,
    })
    .await
    .unwrap();
  }
  tokio::time::sleep(Duration::from_millis(300)).await;

  // the burst collapsed into one analysis of the last revision
  let snapshot = handle.load();
  assert_eq!(snapshot.version(), 3);
  assert_eq!(snapshot.get_all_lines().count(), 2);
}
