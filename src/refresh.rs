//! Background refresher for the stream lists
//!
//! One long-lived worker thread owns the [`StreamSource`]. The UI sends it
//! discrete fetch requests; each completed fetch is classified on the worker and
//! handed to a delivery callback tagged with the generation it was requested
//! under. Cancelling stops the worker and suppresses any result still in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::chain::StreamSource;
use crate::classify::classify;
use crate::models::StreamLists;
use crate::session::WalletSession;

enum RefreshCommand {
    Fetch { generation: u64, session: WalletSession },
    Stop,
}

/// Result of one fetch, errors already rendered for display
#[derive(Debug)]
pub struct RefreshOutcome {
    pub generation: u64,
    pub result: Result<StreamLists, String>,
}

pub struct RefreshTask {
    commands: Option<Sender<RefreshCommand>>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl RefreshTask {
    pub fn spawn<S, F>(mut source: S, deliver: F) -> Self
    where
        S: StreamSource + 'static,
        F: Fn(RefreshOutcome) + Send + 'static,
    {
        let (tx, rx) = channel::<RefreshCommand>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let handle = thread::spawn(move || {
            while let Ok(command) = rx.recv() {
                let (generation, session) = match command {
                    RefreshCommand::Fetch { generation, session } => (generation, session),
                    RefreshCommand::Stop => break,
                };

                let result = source
                    .fetch_streams(&session)
                    .map(classify)
                    .map_err(|e| e.to_string());

                if flag.load(Ordering::SeqCst) {
                    break;
                }
                deliver(RefreshOutcome { generation, result });
            }
        });

        Self {
            commands: Some(tx),
            cancelled,
            handle: Some(handle),
            generation: 0,
        }
    }

    /// Queue a fetch for `session`. Returns false once cancelled.
    pub fn request(&mut self, session: WalletSession) -> bool {
        let generation = self.generation;
        match &self.commands {
            Some(tx) => tx.send(RefreshCommand::Fetch { generation, session }).is_ok(),
            None => false,
        }
    }

    /// Mark every earlier request as stale (account switched, settings changed)
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Stop the worker without waiting for an in-flight RPC to return
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(tx) = self.commands.take() {
            let _ = tx.send(RefreshCommand::Stop);
        }
    }

    /// Wait for the worker to exit. Only returns promptly after `cancel`.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
