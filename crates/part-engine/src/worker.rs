//! Background builds for one part instance.
//!
//! One dedicated thread runs at most one build at a time. Requests go
//! through a single pending slot: a request submitted while another is still
//! queued replaces it. Every request carries a generation number and
//! completions older than the latest submission are discarded on receipt.
//! A running build is never interrupted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use modeling_ops::KernelBundle;
use parking_lot::{Condvar, Mutex};
use part_catalog::SelectionState;
use shape_kernel::TruckKernel;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::families::PartFamily;
use crate::pipeline::{run_pipeline_on, PipelineOutput};

/// Result of one background build.
#[derive(Debug, Clone)]
pub struct BuildCompletion {
    pub worker: Uuid,
    pub generation: u64,
    pub selection: SelectionState,
    pub result: Result<PipelineOutput, PipelineError>,
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<(u64, SelectionState)>,
    shutdown: bool,
}

#[derive(Debug, Default)]
struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
    done: Mutex<VecDeque<BuildCompletion>>,
    finished: Condvar,
    latest: AtomicU64,
    builds: AtomicU64,
}

#[derive(Debug)]
pub struct BuildWorker {
    id: Uuid,
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl BuildWorker {
    /// Start the worker thread. Each build runs on a fresh [`TruckKernel`].
    pub fn spawn(family: Arc<dyn PartFamily>, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::spawn_on::<TruckKernel>(family, config)
    }

    /// Same as [`BuildWorker::spawn`], building on a fresh `K::default()`.
    pub fn spawn_on<K>(family: Arc<dyn PartFamily>, config: PipelineConfig) -> Result<Self, PipelineError>
    where
        K: KernelBundle + Default + 'static,
    {
        let id = Uuid::new_v4();
        let shared = Arc::new(Shared::default());
        let thread = thread::Builder::new()
            .name(format!("part-build-{id}"))
            .spawn({
                let shared = Arc::clone(&shared);
                move || worker_loop::<K>(id, &shared, family.as_ref(), &config)
            })
            .map_err(|e| PipelineError::WorkerUnavailable {
                reason: e.to_string(),
            })?;
        info!(%id, "build worker started");
        Ok(Self {
            id,
            shared,
            thread: Some(thread),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a build of `selection`, replacing any request still waiting.
    /// Returns the request's generation.
    pub fn submit(&self, selection: SelectionState) -> u64 {
        let mut slot = self.shared.slot.lock();
        let generation = self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((replaced, _)) = slot.pending.replace((generation, selection)) {
            debug!(replaced, generation, "queued build superseded");
        }
        self.shared.wake.notify_one();
        generation
    }

    /// Generation of the most recent submission.
    pub fn latest_generation(&self) -> u64 {
        self.shared.latest.load(Ordering::SeqCst)
    }

    /// Number of builds the thread has run to completion.
    pub fn builds_run(&self) -> u64 {
        self.shared.builds.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, completion: &BuildCompletion) -> bool {
        completion.generation >= self.latest_generation()
    }

    /// Next current completion, if one is ready. Stale ones are dropped.
    pub fn try_recv(&self) -> Option<BuildCompletion> {
        let mut done = self.shared.done.lock();
        self.pop_current(&mut done)
    }

    /// Wait up to `timeout` for a current completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<BuildCompletion> {
        let deadline = Instant::now() + timeout;
        let mut done = self.shared.done.lock();
        loop {
            if let Some(completion) = self.pop_current(&mut done) {
                return Some(completion);
            }
            if Instant::now() >= deadline {
                return None;
            }
            self.shared.finished.wait_until(&mut done, deadline);
        }
    }

    fn pop_current(&self, done: &mut VecDeque<BuildCompletion>) -> Option<BuildCompletion> {
        while let Some(completion) = done.pop_front() {
            if self.is_current(&completion) {
                return Some(completion);
            }
            debug!(generation = completion.generation, latest = self.latest_generation(), "discarding stale build");
        }
        None
    }
}

impl Drop for BuildWorker {
    fn drop(&mut self) {
        self.shared.slot.lock().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(id = %self.id, "build worker panicked");
            }
        }
    }
}

fn worker_loop<K>(id: Uuid, shared: &Shared, family: &dyn PartFamily, config: &PipelineConfig)
where
    K: KernelBundle + Default,
{
    loop {
        let (generation, selection) = {
            let mut slot = shared.slot.lock();
            loop {
                if slot.shutdown {
                    debug!(%id, "build worker stopping");
                    return;
                }
                if let Some(request) = slot.pending.take() {
                    break request;
                }
                shared.wake.wait(&mut slot);
            }
        };
        debug!(%id, generation, "build started");
        let result = run_pipeline_on::<K>(family, &selection, config);
        if let Err(e) = &result {
            warn!(%id, generation, error = %e, "background build failed");
        }
        shared.builds.fetch_add(1, Ordering::SeqCst);
        shared.done.lock().push_back(BuildCompletion {
            worker: id,
            generation,
            selection,
            result,
        });
        shared.finished.notify_all();
    }
}
