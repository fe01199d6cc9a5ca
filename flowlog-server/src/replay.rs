//! Replay host: feeds exported flows (one JSON object per line) through the
//! hook pipeline, the way a live proxy would call it on response completion.
//!
//! A reader thread decodes lines and pushes flows onto a bounded channel;
//! `workers` threads pull from it and dispatch concurrently.

use crossbeam_channel::{RecvTimeoutError, bounded};
use flowlog_core::Flow;
use flowlog_plugin::{DispatchOutcome, PluginPipeline};
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// How often idle workers re-check the shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub workers: usize,
    pub queue_capacity: usize,
}

/// Totals for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Non-blank input lines.
    pub lines_read: u64,
    /// Lines that were not a valid flow.
    pub undecodable: u64,
    /// Flows without a response; never dispatched.
    pub incomplete: u64,
    /// Flows handed to the hooks.
    pub dispatched: u64,
    /// Hook errors across all dispatched flows.
    pub hook_failures: u64,
}

#[derive(Default)]
struct Counters {
    lines_read: AtomicU64,
    undecodable: AtomicU64,
    incomplete: AtomicU64,
    dispatched: AtomicU64,
    hook_failures: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ReplayStats {
        ReplayStats {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            undecodable: self.undecodable.load(Ordering::Relaxed),
            incomplete: self.incomplete.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            hook_failures: self.hook_failures.load(Ordering::Relaxed),
        }
    }
}

/// Replay every flow in `input` through `pipeline`.
///
/// Returns once the input is exhausted and all queued flows are dispatched,
/// or soon after `shutdown` is raised. The pipeline's own shutdown hooks are
/// left to the caller.
pub fn run<R>(
    input: R,
    pipeline: Arc<PluginPipeline>,
    options: ReplayOptions,
    shutdown: &'static AtomicBool,
) -> ReplayStats
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = bounded::<Flow>(options.queue_capacity.max(1));
    let counters = Arc::new(Counters::default());

    let reader = {
        let counters = Arc::clone(&counters);
        thread::Builder::new()
            .name("flowlog-reader".to_string())
            .spawn(move || {
                for (idx, line) in input.lines().enumerate() {
                    if shutdown.load(Ordering::Relaxed) {
                        break;
                    }
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!(line = idx + 1, error = %e, "Failed to read input, stopping");
                            break;
                        }
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    counters.lines_read.fetch_add(1, Ordering::Relaxed);
                    match serde_json::from_str::<Flow>(&line) {
                        Ok(flow) => {
                            if tx.send(flow).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            counters.undecodable.fetch_add(1, Ordering::Relaxed);
                            warn!(line = idx + 1, error = %e, "Skipping undecodable flow");
                        }
                    }
                }
                debug!("Input reader finished");
            })
    };

    let workers: Vec<JoinHandle<()>> = (0..options.workers.max(1))
        .filter_map(|i| {
            let rx = rx.clone();
            let pipeline = Arc::clone(&pipeline);
            let counters = Arc::clone(&counters);
            thread::Builder::new()
                .name(format!("flowlog-worker-{i}"))
                .spawn(move || loop {
                    match rx.recv_timeout(SHUTDOWN_POLL) {
                        Ok(flow) => match pipeline.dispatch_response(&flow) {
                            DispatchOutcome::Incomplete => {
                                counters.incomplete.fetch_add(1, Ordering::Relaxed);
                            }
                            DispatchOutcome::Dispatched { failed } => {
                                counters.dispatched.fetch_add(1, Ordering::Relaxed);
                                counters
                                    .hook_failures
                                    .fetch_add(failed as u64, Ordering::Relaxed);
                            }
                        },
                        Err(RecvTimeoutError::Timeout) => {
                            if shutdown.load(Ordering::Relaxed) {
                                break;
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                })
                .map_err(|e| warn!(worker = i, error = %e, "Failed to spawn worker"))
                .ok()
        })
        .collect();
    drop(rx);

    let reader = match reader {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Failed to spawn input reader");
            None
        }
    };

    if workers.is_empty() {
        warn!("No replay workers running, nothing will be dispatched");
    }
    for worker in workers {
        if worker.join().is_err() {
            warn!("Replay worker panicked");
        }
    }

    // A reader blocked on a live input is left behind on shutdown.
    if let Some(reader) = reader {
        if reader.is_finished() || !shutdown.load(Ordering::Relaxed) {
            if reader.join().is_err() {
                warn!("Input reader panicked");
            }
        }
    }

    counters.snapshot()
}
