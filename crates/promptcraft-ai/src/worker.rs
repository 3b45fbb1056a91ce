//! Background generation off the interactive thread.
//!
//! The interactive thread calls [`GenerationWorker::submit`], which returns
//! immediately. The generation runs as a task on the tokio runtime and its
//! result is posted back as a [`GenerationCompleted`] over an `mpsc` channel
//! that the interactive thread drains. The channel may carry the front end's
//! own event type as long as it converts from [`GenerationCompleted`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, error};

use crate::controller::{GenerationError, ServiceReadinessController};
use crate::prompt;

/// Result of one submitted generation, posted to the interactive thread.
#[derive(Debug, Clone)]
pub struct GenerationCompleted {
    pub id: u64,
    pub description: String,
    pub result: Result<String, GenerationError>,
}

/// Reasons a submission is refused before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter a description.")]
    EmptyInput,
    #[error("A prompt is already being generated.")]
    Busy,
}

/// Runs at most one generation at a time on behalf of the interactive thread.
pub struct GenerationWorker<E = GenerationCompleted> {
    controller: Arc<ServiceReadinessController>,
    runtime: Handle,
    events: Sender<E>,
    in_flight: Arc<AtomicBool>,
    next_id: AtomicU64,
}

/// Clears the in-flight flag when the task ends, even by panic.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<E> GenerationWorker<E>
where
    E: From<GenerationCompleted> + Send + 'static,
{
    pub fn new(
        controller: Arc<ServiceReadinessController>,
        runtime: Handle,
        events: Sender<E>,
    ) -> Self {
        Self {
            controller,
            runtime,
            events,
            in_flight: Arc::new(AtomicBool::new(false)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Whether a generation is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start generating from `description` with the configured model.
    ///
    /// Blank input and a second submission while one is outstanding are
    /// rejected synchronously.
    pub fn submit(&self, description: &str) -> Result<u64, SubmitError> {
        if prompt::is_blank(description) {
            return Err(SubmitError::EmptyInput);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::Busy);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let controller = Arc::clone(&self.controller);
        let owned = description.to_string();

        self.spawn_job(id, description.to_string(), guard, async move {
            let model = controller.config().model.clone();
            controller.generate(&owned, &model).await
        });

        debug!("Submitted generation {}", id);
        Ok(id)
    }

    /// Run `job` and post its result. A panicking job still posts a
    /// completion and releases the in-flight flag.
    fn spawn_job<F>(&self, id: u64, description: String, guard: InFlightGuard, job: F)
    where
        F: Future<Output = Result<String, GenerationError>> + Send + 'static,
    {
        let events = self.events.clone();
        let task = self.runtime.spawn(job);

        self.runtime.spawn(async move {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    error!("Generation {} task failed: {}", id, e);
                    Err(GenerationError::Request(format!(
                        "generation task failed: {}",
                        e
                    )))
                }
            };
            drop(guard);

            let completed = GenerationCompleted {
                id,
                description,
                result,
            };
            if events.send(E::from(completed)).is_err() {
                debug!("Generation {} finished after the receiver closed", id);
            }
        });
    }
}
