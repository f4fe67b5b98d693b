//! Debounced analysis driver.
//!
//! Hosts feed document events into the hook from their edit notifications
//! (see [`rulers_event::send_blocking`] for non-async threads). Each event
//! immediately supersedes any computation in flight; the recomputation
//! itself is debounced so a burst of keystrokes costs one analysis pass.
//! Synchronous hosts can skip the hook entirely and call
//! [`GuideHandle::poll`] themselves.

use std::{
  sync::Arc,
  time::Duration,
};

use ropey::Rope;
use rulers_core::LineEdit;
use rulers_event::AsyncHook;
use tokio::{
  sync::mpsc::Sender,
  time::Instant,
};

use crate::handle::GuideHandle;

/// Keystroke bursts shorter than this collapse into one recomputation.
const DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub enum AnalysisEvent {
  Edit {
    doc: Rope,
    version: u64,
    edit: LineEdit,
  },
  Reset {
    doc: Rope,
    version: u64,
  },
}

/// Feeds document events into a [`GuideHandle`] from a background worker.
pub struct AnalysisHook {
  handle: Arc<GuideHandle>,
}

impl AnalysisHook {
  pub fn new(handle: Arc<GuideHandle>) -> Self {
    Self { handle }
  }

  pub fn spawn(self) -> Sender<AnalysisEvent> {
    AsyncHook::spawn(self)
  }
}

impl AsyncHook for AnalysisHook {
  type Event = AnalysisEvent;

  fn handle_event(&mut self, event: AnalysisEvent, _timeout: Option<Instant>) -> Option<Instant> {
    // enqueue right away so the in-flight computation is superseded
    // promptly; only the recomputation is debounced
    match event {
      AnalysisEvent::Edit { doc, version, edit } => self.handle.update_document(doc, version, edit),
      AnalysisEvent::Reset { doc, version } => self.handle.reset_document(doc, version),
    }
    Some(Instant::now() + DEBOUNCE)
  }

  fn finish_debounce(&mut self) {
    self.handle.poll();
  }
}
