//! Parallel alignment of independent requests.
//!
//! Every request gets its own context on whichever worker picks it up, so
//! workers share nothing but the two channels.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

use crate::config::AlignmentRequest;
use crate::context::AlignmentOutput;
use crate::scoring::Score;
use crate::{AlignerError, Result};

struct WorkItem<S> {
    index: usize,
    request: AlignmentRequest<S>,
    cell_limit: Option<usize>,
}

struct WorkResult {
    index: usize,
    worker_id: usize,
    result: Result<AlignmentOutput>,
}

pub struct BatchAligner<S> {
    work_tx: Option<Sender<WorkItem<S>>>,
    result_rx: Receiver<WorkResult>,
    workers: Vec<thread::JoinHandle<()>>,
    cell_limit: Option<usize>,
}

impl<S: Score> BatchAligner<S> {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(AlignerError::InvalidParameter {
                name: "workers",
                value: workers.to_string(),
            });
        }

        let (work_tx, work_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("align-worker-{}", worker_id))
                .spawn(move || Self::worker(worker_id, work_rx, result_tx))
                .map_err(|e| AlignerError::Worker(e.to_string()))?;
            handles.push(handle);
        }
        debug!("Started {} alignment workers", workers);

        Ok(Self {
            work_tx: Some(work_tx),
            result_rx,
            workers: handles,
            cell_limit: None,
        })
    }

    /// Applied to every request aligned afterwards.
    pub fn with_cell_limit(mut self, limit: usize) -> Self {
        self.cell_limit = Some(limit);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    fn worker(worker_id: usize, work_rx: Receiver<WorkItem<S>>, result_tx: Sender<WorkResult>) {
        while let Ok(work) = work_rx.recv() {
            let WorkItem {
                index,
                request,
                cell_limit,
            } = work;

            let result = panic::catch_unwind(AssertUnwindSafe(|| Self::run(&request, cell_limit)))
                .unwrap_or_else(|payload| Err(AlignerError::Worker(panic_message(payload.as_ref()))));

            if result_tx
                .send(WorkResult {
                    index,
                    worker_id,
                    result,
                })
                .is_err()
            {
                break;
            }
        }
    }

    fn run(request: &AlignmentRequest<S>, cell_limit: Option<usize>) -> Result<AlignmentOutput> {
        let mut ctx = request.to_context();
        if let Some(limit) = cell_limit {
            ctx = ctx.with_cell_limit(limit);
        }
        ctx.align()?;
        ctx.make_output(request.output_kind())
    }

    /// Aligns every request and returns the outputs in input order.
    ///
    /// All requests are run to completion even if some fail; the error
    /// returned is the one of the earliest failing request.
    pub fn align_parallel(&mut self, requests: Vec<AlignmentRequest<S>>) -> Result<Vec<AlignmentOutput>> {
        let total = requests.len();
        let work_tx = self
            .work_tx
            .as_ref()
            .ok_or_else(|| AlignerError::Worker("work channel closed".into()))?;

        for (index, request) in requests.into_iter().enumerate() {
            work_tx
                .send(WorkItem {
                    index,
                    request,
                    cell_limit: self.cell_limit,
                })
                .map_err(|e| AlignerError::Worker(e.to_string()))?;
        }

        let mut slots: Vec<Option<Result<AlignmentOutput>>> = (0..total).map(|_| None).collect();
        for _ in 0..total {
            let work_result = self
                .result_rx
                .recv()
                .map_err(|e| AlignerError::Worker(e.to_string()))?;
            debug!(
                "Request {} finished on worker {}",
                work_result.index, work_result.worker_id
            );
            slots[work_result.index] = Some(work_result.result);
        }
        debug!("Aligned a batch of {} requests", total);

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(AlignerError::Worker("result missing".into()))))
            .collect()
    }
}

impl<S> Drop for BatchAligner<S> {
    fn drop(&mut self) {
        // Closing the work channel stops the workers.
        self.work_tx.take();

        while let Some(worker) = self.workers.pop() {
            let _ = worker.join();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
