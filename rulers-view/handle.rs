//! Per-view analysis handle: serializes recomputation and publishes
//! snapshots atomically.
//!
//! Edits and viewport refreshes may race. Every enqueue supersedes whatever
//! computation is in flight (via the generation counter), and a computation
//! publishes only if it is still the latest when it finishes — a stale
//! result is never stored. Readers hold an `Arc` to a complete, immutable
//! [`Snapshot`]; publication is a single atomic pointer swap.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use ropey::Rope;
use rulers_core::{
  DocumentAnalyzer,
  LineEdit,
  Snapshot,
};
use rulers_event::TaskController;

/// Work accumulated against the currently published snapshot.
#[derive(Debug, Clone)]
struct Pending {
  doc: Rope,
  version: u64,
  /// `None` forces a full recomputation.
  edit: Option<LineEdit>,
}

pub struct GuideHandle {
  analyzer: DocumentAnalyzer,
  pending: Mutex<Option<Pending>>,
  controller: TaskController,
  snapshot: ArcSwap<Snapshot>,
}

impl GuideHandle {
  /// Create the handle and run an initial full analysis synchronously.
  pub fn new(analyzer: DocumentAnalyzer, doc: &Rope, version: u64) -> Self {
    let snapshot = match analyzer.reset(doc.slice(..), version, || false) {
      Ok(snapshot) => snapshot,
      Err(_) => Snapshot::empty(version),
    };
    Self {
      analyzer,
      pending: Mutex::new(None),
      controller: TaskController::new(),
      snapshot: ArcSwap::from_pointee(snapshot),
    }
  }

  /// Latest published snapshot.
  pub fn load(&self) -> Arc<Snapshot> {
    self.snapshot.load_full()
  }

  pub fn analyzer(&self) -> &DocumentAnalyzer {
    &self.analyzer
  }

  /// Queue an incremental update, superseding any computation in flight.
  /// Successive edits coalesce into one hint against the published baseline.
  pub fn update_document(&self, doc: Rope, version: u64, edit: LineEdit) {
    let mut pending = self.pending.lock();
    *pending = Some(match pending.take() {
      Some(prev) => Pending {
        doc,
        version,
        edit: prev.edit.map(|earlier| earlier.merge(edit)),
      },
      None => Pending {
        doc,
        version,
        edit: Some(edit),
      },
    });
    self.controller.cancel();
  }

  /// Queue a full recomputation (config change, document reload).
  pub fn reset_document(&self, doc: Rope, version: u64) {
    let mut pending = self.pending.lock();
    *pending = Some(Pending {
      doc,
      version,
      edit: None,
    });
    self.controller.cancel();
  }

  /// Flush queued work: recompute and publish, unless superseded mid-run.
  ///
  /// Returns whether a new snapshot was published. Queued work survives a
  /// superseded run, so a later poll picks it up.
  pub fn poll(&self) -> bool {
    let (work, handle) = {
      let pending = self.pending.lock();
      let Some(work) = pending.clone() else {
        return false;
      };
      (work, self.controller.handle())
    };

    let previous = self.snapshot.load_full();
    let is_cancelled = || handle.is_canceled();
    let result = match work.edit {
      Some(edit) => {
        self
          .analyzer
          .update(&previous, work.doc.slice(..), edit, work.version, is_cancelled)
      },
      None => self.analyzer.reset(work.doc.slice(..), work.version, is_cancelled),
    };
    let Ok(snapshot) = result else {
      return false;
    };

    let mut pending = self.pending.lock();
    if handle.is_canceled() {
      // a newer enqueue merged more work into `pending`; let it win
      return false;
    }
    self.snapshot.store(Arc::new(snapshot));
    *pending = None;
    true
  }
}

#[cfg(test)]
mod tests {
  use rulers_core::{
    LineBehavior,
    LineSpan,
  };

  use super::*;

  fn handle(text: &str) -> GuideHandle {
    let analyzer = DocumentAnalyzer::new(LineBehavior::default(), 4, 4).unwrap();
    GuideHandle::new(analyzer, &Rope::from_str(text), 0)
  }

  #[test]
  fn initial_snapshot_is_analyzed_synchronously() {
    let handle = handle("if x:\n    y");
    let snapshot = handle.load();
    assert_eq!(snapshot.get_all_lines().count(), 1);
    assert_eq!(snapshot.version(), 0);
    assert_eq!(handle.analyzer().indent_size(), 4);
  }

  #[test]
  fn poll_flushes_queued_edits() {
    let handle = handle("    a");
    let edit = LineEdit {
      first_line: 0,
      old_last_line: 0,
      new_last_line: 1,
    };
    handle.update_document(Rope::from_str("    a\n        b"), 1, edit);
    assert!(handle.poll());

    let snapshot = handle.load();
    assert_eq!(snapshot.version(), 1);
    let keys: Vec<_> = snapshot.get_all_lines().map(LineSpan::key).collect();
    assert!(keys.contains(&LineSpan::new(0, 1, 4).key()));
    assert!(keys.contains(&LineSpan::new(1, 1, 8).key()));

    // nothing left to do
    assert!(!handle.poll());
  }

  #[test]
  fn coalesced_edits_publish_the_last_document() {
    let handle = handle("a");
    handle.update_document(
      Rope::from_str("a\n    b"),
      1,
      LineEdit {
        first_line: 0,
        old_last_line: 0,
        new_last_line: 1,
      },
    );
    handle.update_document(
      Rope::from_str("a\n    b\n    c"),
      2,
      LineEdit {
        first_line: 1,
        old_last_line: 1,
        new_last_line: 2,
      },
    );
    assert!(handle.poll());
    let snapshot = handle.load();
    assert_eq!(snapshot.version(), 2);
    assert_eq!(snapshot.line_count(), 3);
    let keys: Vec<_> = snapshot.get_all_lines().map(LineSpan::key).collect();
    assert_eq!(keys, vec![LineSpan::new(1, 2, 4).key()]);
  }

  #[test]
  fn reset_swallows_queued_edits() {
    let handle = handle("a");
    handle.update_document(
      Rope::from_str("a\n    b"),
      1,
      LineEdit {
        first_line: 0,
        old_last_line: 0,
        new_last_line: 1,
      },
    );
    handle.reset_document(Rope::from_str("    z"), 2);
    assert!(handle.poll());
    let snapshot = handle.load();
    assert_eq!(snapshot.version(), 2);
    assert_eq!(snapshot.line_count(), 1);
  }
}
