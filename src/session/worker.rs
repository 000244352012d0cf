//! Background session worker.
//!
//! Drains a chunk channel on a dedicated thread and runs one pipeline tick
//! per chunk, in arrival order. External model calls dominate tick latency
//! and may block, so giving each session its own worker keeps one user's
//! slow inference from stalling another's.

use crate::session::session::{Session, TickOutput};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::mpsc;

/// Configuration for a session worker.
#[derive(Debug, Clone)]
pub struct SessionWorkerConfig {
    /// Chunk channel capacity (frames buffered while a tick runs).
    pub chunk_buffer_size: usize,
    /// Output channel capacity.
    pub output_buffer_size: usize,
}

impl Default for SessionWorkerConfig {
    fn default() -> Self {
        Self {
            chunk_buffer_size: 64,
            output_buffer_size: 64,
        }
    }
}

/// Worker that owns the tick loop for one session.
pub struct SessionWorker {
    session: Arc<Mutex<Session>>,
    config: SessionWorkerConfig,
    running: Arc<AtomicBool>,
}

impl SessionWorker {
    /// Creates a worker for the given session.
    pub fn new(session: Arc<Mutex<Session>>) -> Self {
        Self::with_config(session, SessionWorkerConfig::default())
    }

    /// Creates a worker with custom channel sizes.
    pub fn with_config(session: Arc<Mutex<Session>>, config: SessionWorkerConfig) -> Self {
        Self {
            session,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Starts the tick loop on a background thread.
    ///
    /// Returns the chunk sender, the tick-output receiver, and a control
    /// handle. The loop runs until the sender is dropped or `stop()` is
    /// called; chunks are processed strictly in send order.
    pub fn start(
        self,
    ) -> (
        mpsc::Sender<Vec<f32>>,
        mpsc::Receiver<TickOutput>,
        SessionWorkerHandle,
    ) {
        let (chunk_tx, mut chunk_rx) = mpsc::channel::<Vec<f32>>(self.config.chunk_buffer_size);
        let (output_tx, output_rx) = mpsc::channel(self.config.output_buffer_size);

        let running = self.running.clone();
        running.store(true, Ordering::SeqCst);

        let session = self.session;
        thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let Some(chunk) = chunk_rx.blocking_recv() else {
                    break;
                };

                // Re-check after waking: a stop may have landed while the
                // thread was parked waiting for input
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let output = {
                    let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
                    session.process_chunk(&chunk)
                };

                // Stop if the receiver is gone
                if output_tx.blocking_send(output).is_err() {
                    break;
                }
            }
            running.store(false, Ordering::SeqCst);
        });

        let handle = SessionWorkerHandle {
            running: self.running,
        };

        (chunk_tx, output_rx, handle)
    }
}

/// Handle to control a running session worker.
#[derive(Clone)]
pub struct SessionWorkerHandle {
    running: Arc<AtomicBool>,
}

impl SessionWorkerHandle {
    /// Signals the worker to stop.
    ///
    /// A tick already in progress completes; any chunk received after the
    /// signal is discarded. A worker parked waiting for input exits on the
    /// next send or when the sender is dropped.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Returns true if the worker loop is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
