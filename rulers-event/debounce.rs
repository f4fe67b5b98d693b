//! Debounced async hooks: background tokio workers fed through a channel.

use std::time::Duration;

use futures_executor::block_on;
use tokio::{
  sync::mpsc::{
    self,
    Sender,
    error::TrySendError,
  },
  time::Instant,
};

const CHANNEL_CAPACITY: usize = 128;

/// Upper bound on how long a synchronous sender blocks on a full channel.
/// Past that the event is dropped; a lost refresh beats a stalled caller.
const SEND_TIMEOUT: Duration = Duration::from_millis(2);

/// An event handler running as a background tokio task.
///
/// `handle_event` runs for every event as it arrives and either consumes it
/// or schedules (or extends) a debounce deadline; `finish_debounce` runs once
/// the deadline passes with no further events.
pub trait AsyncHook: Sync + Send + 'static + Sized {
  type Event: Sync + Send + 'static;

  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant>;

  fn finish_debounce(&mut self);

  fn spawn(self) -> mpsc::Sender<Self::Event> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    // Hooks constructed outside a runtime (unit tests) just never get a
    // worker; sends then fail closed and are dropped.
    if tokio::runtime::Handle::try_current().is_ok() {
      tokio::spawn(run(self, rx));
    }
    tx
  }
}

async fn run<H: AsyncHook>(mut hook: H, mut rx: mpsc::Receiver<H::Event>) {
  let mut deadline = None;
  loop {
    let event = match deadline {
      Some(instant) => {
        match tokio::time::timeout_at(instant, rx.recv()).await {
          Ok(event) => event,
          Err(_) => {
            hook.finish_debounce();
            deadline = None;
            continue;
          },
        }
      },
      None => rx.recv().await,
    };
    let Some(event) = event else { break };
    deadline = hook.handle_event(event, deadline);
  }
}

/// Send to a hook from synchronous code, blocking at most [`SEND_TIMEOUT`]
/// when the channel is full.
pub fn send_blocking<T>(tx: &Sender<T>, event: T) {
  match tx.try_send(event) {
    Ok(()) => {},
    Err(TrySendError::Full(event)) => {
      let _ = block_on(tx.send_timeout(event, SEND_TIMEOUT));
    },
    Err(TrySendError::Closed(_)) => {
      log::warn!("event dropped: hook worker is gone");
    },
  }
}
