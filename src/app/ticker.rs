//! Clock for the live resource display.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::app::Completion;

/// Posts [`Completion::Tick`] every `period` while alive. Dropping the ticker
/// stops it.
#[derive(Debug)]
pub struct ProjectionTicker {
    handle: JoinHandle<()>,
}

impl ProjectionTicker {
    pub fn start(period: Duration, completions: UnboundedSender<Completion>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if completions.send(Completion::Tick).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for ProjectionTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
