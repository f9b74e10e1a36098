use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::error::Result;
use crate::library::{AudioHandle, TrackId};

use super::extract::{TagInfo, read_tags};

/// Which selection a request belongs to. The generation is bumped on every
/// (re-)selection, so two selections of the same track never compare equal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SelectionId {
    pub track: TrackId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRequest {
    pub selection: SelectionId,
    pub handle: AudioHandle,
}

#[derive(Debug, Clone)]
pub struct MetadataOutcome {
    pub selection: SelectionId,
    /// The error is already rendered; it is only ever logged.
    pub result: std::result::Result<TagInfo, String>,
}

enum Job {
    Extract(MetadataRequest),
    Quit,
}

type Reader = dyn Fn(&Path) -> Result<TagInfo> + Send + Sync;

/// Runs tag extraction on its own thread.
///
/// Requests queued behind a newer one are skipped: only the latest
/// selection can still be applied, so reading the older files is wasted work.
pub struct MetadataWorker {
    tx: Sender<Job>,
    outcomes: Receiver<MetadataOutcome>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl MetadataWorker {
    pub fn spawn() -> Self {
        Self::spawn_with(Arc::new(read_tags))
    }

    /// Spawn with a custom tag reader.
    pub fn spawn_with(reader: Arc<Reader>) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let (out_tx, outcomes) = mpsc::channel::<MetadataOutcome>();

        let join = thread::Builder::new()
            .name("lyrebird-metadata".into())
            .spawn(move || run(rx, out_tx, reader))
            .map_err(|e| warn!("failed to spawn metadata worker: {e}"))
            .ok();

        Self {
            tx,
            outcomes,
            join: Mutex::new(join),
        }
    }

    pub fn request(&self, request: MetadataRequest) {
        if self.tx.send(Job::Extract(request)).is_err() {
            warn!("metadata worker is gone; dropping request");
        }
    }

    /// Drain outcomes finished since the last call.
    pub fn try_outcomes(&self) -> Vec<MetadataOutcome> {
        self.outcomes.try_iter().collect()
    }

    /// Block until the next outcome arrives (tests and shutdown only).
    pub fn recv_outcome(&self) -> Option<MetadataOutcome> {
        self.outcomes.recv().ok()
    }

    pub fn quit(&self) {
        let _ = self.tx.send(Job::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

fn run(rx: Receiver<Job>, out: Sender<MetadataOutcome>, reader: Arc<Reader>) {
    while let Ok(job) = rx.recv() {
        let Job::Extract(mut request) = job else {
            break;
        };

        // Coalesce: keep only the newest pending request.
        let mut quit = false;
        for next in rx.try_iter() {
            match next {
                Job::Extract(newer) => {
                    debug!(skipped = ?request.selection, "superseded metadata request");
                    request = newer;
                }
                Job::Quit => {
                    quit = true;
                    break;
                }
            }
        }
        if quit {
            break;
        }

        let result = reader(request.handle.path()).map_err(|e| e.to_string());
        let outcome = MetadataOutcome {
            selection: request.selection,
            result,
        };
        if out.send(outcome).is_err() {
            break;
        }
    }
    debug!("metadata worker stopped");
}
