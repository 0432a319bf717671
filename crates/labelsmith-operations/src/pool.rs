//! Bounded-concurrency execution of per-repository jobs.

use std::{
    any::Any,
    fmt::Write as _,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Mutex, PoisonError},
};

use labelsmith_core::{error::LabelsmithError, ApiError, LabelsmithResult};
use rayon::ThreadPoolBuilder;
use tracing::{debug, error};

/// Output and errors accumulated by one job.
#[derive(Debug, Default)]
pub struct JobReport {
    prefix: String,
    output: String,
    errors: Vec<ApiError>,
}

impl JobReport {
    /// A report whose lines are prefixed with `prefix: `.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        let _ = writeln!(self.output, "{}: {}", self.prefix, message.as_ref());
    }

    /// Records `err` and a line describing what failed.
    pub fn fail(&mut self, err: ApiError, message: impl AsRef<str>) {
        let _ = writeln!(self.output, "{}: {}: {err}", self.prefix, message.as_ref());
        self.errors.push(err);
    }

    pub fn errors(&self) -> &[ApiError] {
        &self.errors
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

/// The outcome of one job, stamped with the job's submission index.
#[derive(Debug)]
pub struct JobResult {
    pub position: usize,
    pub output: String,
    pub success: bool,
    pub errors: Vec<ApiError>,
}

impl JobResult {
    fn new(position: usize, report: JobReport) -> Self {
        Self {
            position,
            success: report.errors.is_empty(),
            output: report.output,
            errors: report.errors,
        }
    }

    fn panicked(position: usize, payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        error!(position, "job panicked: {message}");

        let err = ApiError::Unclassified(format!("job panicked: {message}"));
        Self {
            position,
            output: format!("job {position}: {err}\n"),
            success: false,
            errors: vec![err],
        }
    }
}

struct Job<F> {
    position: usize,
    work: F,
}

impl<F> Job<F>
where
    F: FnOnce() -> JobReport,
{
    fn execute(self) -> JobResult {
        let position = self.position;
        match catch_unwind(AssertUnwindSafe(self.work)) {
            Ok(report) => JobResult::new(position, report),
            Err(payload) => JobResult::panicked(position, payload),
        }
    }
}

/// Runs jobs on at most `limit` worker threads.
#[derive(Clone, Copy, Debug)]
pub struct WorkerPool {
    limit: usize,
}

impl WorkerPool {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Executes every job and returns their results in submission order.
    ///
    /// `on_complete(done, total)` is called after each job finishes, with
    /// `done` strictly increasing across calls.
    pub fn run<F>(
        &self,
        jobs: Vec<F>,
        on_complete: impl Fn(usize, usize) + Sync,
    ) -> LabelsmithResult<Vec<JobResult>>
    where
        F: FnOnce() -> JobReport + Send,
    {
        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        debug!(total, workers = self.limit, "starting worker pool");
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.limit)
            .thread_name(|i| format!("labelsmith-worker-{i}"))
            .build()
            .map_err(|err| {
                LabelsmithError::Custom(format!("failed to start worker pool: {err}"))
            })?;

        let slots: Vec<Mutex<Option<JobResult>>> = (0..total).map(|_| Mutex::new(None)).collect();
        let completed = Mutex::new(0usize);

        pool.scope(|scope| {
            for (position, work) in jobs.into_iter().enumerate() {
                let slots = &slots;
                let completed = &completed;
                let on_complete = &on_complete;
                scope.spawn(move |_| {
                    let result = Job {
                        position,
                        work,
                    }
                    .execute();
                    *slots[position]
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(result);

                    let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
                    *done += 1;
                    on_complete(*done, total);
                });
            }
        });

        slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                slot.into_inner()
                    .unwrap_or_else(PoisonError::into_inner)
                    .ok_or_else(|| {
                        LabelsmithError::Custom(format!("job {position} produced no result"))
                    })
            })
            .collect()
    }
}
