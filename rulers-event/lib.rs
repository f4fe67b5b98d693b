//! Async plumbing shared by the view layer: debounced background hooks and
//! generation-counter cancellation for superseded work.

pub mod cancel;
pub mod debounce;

pub use cancel::{
  TaskController,
  TaskHandle,
};
pub use debounce::{
  AsyncHook,
  send_blocking,
};
