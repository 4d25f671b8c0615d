//! Background jobs
//!
//! Long workflows (bulk reconciliation, cloud transfers) run off the
//! calling task and report back through an unbounded channel, so the
//! caller keeps a single place where results arrive.
//!
//! ```ignore
//! let (jobs, mut events) = JobQueue::channel();
//! jobs.run_blocking("recalc", move || recalc(&ctx));
//! let report = jobs::wait(&mut events).await?;
//! ```

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{AppError, AppResult};

/// Progress of one job
#[derive(Debug)]
pub enum JobEvent<T> {
    Started { job: &'static str },
    Completed { job: &'static str, output: T },
    Failed { job: &'static str, error: AppError },
}

/// Spawns jobs and posts their events
#[derive(Debug)]
pub struct JobQueue<T> {
    tx: mpsc::UnboundedSender<JobEvent<T>>,
}

impl<T> Clone for JobQueue<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T: Send + 'static> JobQueue<T> {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<JobEvent<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn post(&self, event: JobEvent<T>) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Job event dropped, receiver gone");
        }
    }

    fn finish(&self, job: &'static str, result: AppResult<T>) {
        match result {
            Ok(output) => {
                tracing::info!(job, "Job completed");
                self.post(JobEvent::Completed { job, output });
            }
            Err(error) => {
                tracing::error!(job, error = %error, "Job failed");
                self.post(JobEvent::Failed { job, error });
            }
        }
    }

    /// Run blocking file work on the blocking pool
    pub fn run_blocking<F>(&self, job: &'static str, f: F) -> JoinHandle<()>
    where
        F: FnOnce() -> AppResult<T> + Send + 'static,
    {
        let queue = self.clone();
        tokio::spawn(async move {
            queue.post(JobEvent::Started { job });
            let result = match tokio::task::spawn_blocking(f).await {
                Ok(result) => result,
                Err(e) => Err(AppError::internal(format!("job {job} panicked: {e}"))),
            };
            queue.finish(job, result);
        })
    }

    /// Run an async workflow as a task
    pub fn run<Fut>(&self, job: &'static str, fut: Fut) -> JoinHandle<()>
    where
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let queue = self.clone();
        tokio::spawn(async move {
            queue.post(JobEvent::Started { job });
            let result = match tokio::spawn(fut).await {
                Ok(result) => result,
                Err(e) => Err(AppError::internal(format!("job {job} panicked: {e}"))),
            };
            queue.finish(job, result);
        })
    }
}

/// Wait for the next job to complete or fail
pub async fn wait<T>(events: &mut mpsc::UnboundedReceiver<JobEvent<T>>) -> AppResult<T> {
    while let Some(event) = events.recv().await {
        match event {
            JobEvent::Started { job } => tracing::debug!(job, "Job started"),
            JobEvent::Completed { output, .. } => return Ok(output),
            JobEvent::Failed { error, .. } => return Err(error),
        }
    }
    Err(AppError::internal("job queue closed before the job finished"))
}
