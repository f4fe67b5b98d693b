//! Cooperative cancellation built on a generation counter.
//!
//! Every recomputation request bumps the controller's generation. A running
//! task holds the [`TaskHandle`] it was started with and checks it at safe
//! points, abandoning itself once the generation has moved on. Cancellation
//! is best-effort; correctness only requires that a superseded task's result
//! is never published.

use std::sync::{
  Arc,
  atomic::{
    AtomicU64,
    Ordering,
  },
};

#[derive(Debug, Default)]
pub struct TaskController {
  current: Arc<AtomicU64>,
}

impl TaskController {
  pub fn new() -> Self {
    Self::default()
  }

  /// Supersede any running task and return the handle for the new one.
  pub fn restart(&self) -> TaskHandle {
    let generation = self.current.fetch_add(1, Ordering::Relaxed) + 1;
    TaskHandle {
      generation,
      current: Arc::clone(&self.current),
    }
  }

  /// Supersede any running task without starting a new one.
  pub fn cancel(&self) {
    self.current.fetch_add(1, Ordering::Relaxed);
  }

  /// Handle for the current generation, without superseding anything.
  pub fn handle(&self) -> TaskHandle {
    TaskHandle {
      generation: self.current.load(Ordering::Relaxed),
      current: Arc::clone(&self.current),
    }
  }
}

/// Cancellation token held by one running task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
  generation: u64,
  current: Arc<AtomicU64>,
}

impl TaskHandle {
  /// True once a newer request has superseded this task.
  pub fn is_canceled(&self) -> bool {
    self.current.load(Ordering::Relaxed) != self.generation
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn restart_supersedes_older_handles() {
    let controller = TaskController::new();
    let first = controller.restart();
    assert!(!first.is_canceled());

    let second = controller.restart();
    assert!(first.is_canceled());
    assert!(!second.is_canceled());
  }

  #[test]
  fn cancel_invalidates_without_a_successor() {
    let controller = TaskController::new();
    let handle = controller.restart();
    controller.cancel();
    assert!(handle.is_canceled());
  }

  #[test]
  fn handle_observes_the_current_generation() {
    let controller = TaskController::new();
    controller.cancel();
    let handle = controller.handle();
    assert!(!handle.is_canceled());
    controller.cancel();
    assert!(handle.is_canceled());
  }
}
