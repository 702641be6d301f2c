//! Running a compiled export through the encoder process.
//!
//! Exports run on a worker thread, one at a time. Cancellation kills the
//! encoder outright; partial output is left as-is.

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ExportError, ExportResult};
use crate::export::ExportPlan;

/// How often the worker checks for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle for cancelling an in-progress export.
#[derive(Debug, Clone)]
pub struct ExportCancel(Arc<AtomicBool>);

impl ExportCancel {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for ExportCancel {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `plan` to completion on the current thread.
///
/// Returns `EncoderFailure` with the encoder's stderr on a non-zero exit and
/// `Cancelled` if `cancel` fires first.
pub fn run_blocking(plan: &ExportPlan, cancel: &ExportCancel) -> ExportResult<()> {
    info!("Starting export to {}", plan.output_path.display());

    let mut child = Command::new(&plan.program)
        .args(plan.to_args())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    // Drain stderr concurrently so a chatty encoder cannot block on a full pipe.
    let stderr = child.stderr.take();
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    });

    let status = loop {
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            warn!("Export to {} cancelled", plan.output_path.display());
            return Err(ExportError::Cancelled);
        }
        match child.try_wait()? {
            Some(status) => break status,
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    let stderr = reader.join().unwrap_or_default();

    if status.success() {
        info!("Export to {} finished", plan.output_path.display());
        Ok(())
    } else {
        warn!("Encoder exited with {status}");
        Err(ExportError::EncoderFailure {
            code: status.code(),
            stderr,
        })
    }
}

/// Clears the runner's active slot when the worker ends, even on panic.
struct ActiveGuard(Arc<Mutex<Option<PathBuf>>>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

/// Starts exports in the background, at most one at a time.
#[derive(Debug, Clone, Default)]
pub struct ExportRunner {
    active: Arc<Mutex<Option<PathBuf>>>,
}

impl ExportRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an export is running.
    pub fn is_busy(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Output path of the running export.
    pub fn active_output(&self) -> Option<PathBuf> {
        self.active.lock().clone()
    }

    /// Spawn `plan` on a worker thread.
    ///
    /// Fails with `AlreadyRunning` if another export has not finished.
    pub fn start(&self, plan: ExportPlan) -> ExportResult<ExportHandle> {
        {
            let mut active = self.active.lock();
            if active.is_some() {
                return Err(ExportError::AlreadyRunning);
            }
            *active = Some(plan.output_path.clone());
        }

        let cancel = ExportCancel::new();
        let (tx, rx) = crossbeam_channel::bounded(1);
        let guard = ActiveGuard(Arc::clone(&self.active));
        let worker_cancel = cancel.clone();

        let spawned = thread::Builder::new()
            .name("splice-export".into())
            .spawn(move || {
                let result = run_blocking(&plan, &worker_cancel);
                // Release the slot before reporting so a waiter sees an idle runner.
                drop(guard);
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => Ok(ExportHandle { cancel, result: rx }),
            Err(e) => {
                *self.active.lock() = None;
                Err(e.into())
            }
        }
    }
}

/// A running export.
#[derive(Debug)]
pub struct ExportHandle {
    cancel: ExportCancel,
    result: Receiver<ExportResult<()>>,
}

impl ExportHandle {
    /// Kill the encoder.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A cancel handle that can be moved to another thread.
    pub fn cancel_handle(&self) -> ExportCancel {
        self.cancel.clone()
    }

    /// The outcome, if the export has finished.
    pub fn try_result(&self) -> Option<ExportResult<()>> {
        self.result.try_recv().ok()
    }

    /// Block until the export finishes.
    pub fn wait(self) -> ExportResult<()> {
        self.result.recv().unwrap_or_else(|_| {
            Err(ExportError::Io(std::io::Error::other(
                "export worker stopped without reporting a result",
            )))
        })
    }
}
