//! Completion delivery.
//!
//! Operations run on the tokio runtime; their completion callbacks always run
//! on one dedicated delivery thread, whatever worker finished the work.

use std::future::Future;

use tokio::{runtime::Handle, sync::mpsc};

use crate::{EngineError, ResultEngine};

/// Name of the thread that runs every completion callback.
pub const DELIVERY_THREAD: &str = "frollo-delivery";

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone, Debug)]
pub struct Delivery {
    sender: mpsc::UnboundedSender<Job>,
    runtime: Handle,
}

impl Delivery {
    /// Start the delivery thread. Work handed to [`Delivery::complete`] is
    /// spawned on `runtime`.
    ///
    /// The thread exits once every `Delivery` clone has been dropped.
    pub fn spawn(runtime: Handle) -> ResultEngine<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        std::thread::Builder::new()
            .name(DELIVERY_THREAD.to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    job();
                }
                tracing::debug!("delivery thread stopped");
            })
            .map_err(|err| EngineError::Setup(format!("failed to start delivery thread: {err}")))?;

        Ok(Self { sender, runtime })
    }

    /// Queue `job` on the delivery thread.
    pub fn deliver(&self, job: impl FnOnce() + Send + 'static) {
        if self.sender.send(Box::new(job)).is_err() {
            tracing::warn!("delivery thread is gone; completion dropped");
        }
    }

    /// Run `operation` to completion on the runtime, then hand its result to
    /// `completion` on the delivery thread.
    ///
    /// The operation cannot be cancelled: dropping interest in the result
    /// does not stop the work.
    pub fn complete<F, T, C>(&self, operation: F, completion: C)
    where
        F: Future<Output = ResultEngine<T>> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(ResultEngine<T>) + Send + 'static,
    {
        let delivery = self.clone();
        self.runtime.spawn(async move {
            let result = operation.await;
            delivery.deliver(move || completion(result));
        });
    }
}
