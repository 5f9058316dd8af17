//! Rayon thread pool configuration for report scanning.
//!
//! Use [WorkerPool::install] to process reports on a fixed number of threads, or rely on
//! Rayon's global pool (all CPU cores).

use rayon::ThreadPoolBuilder;

/// How many worker threads process reports in parallel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use the global Rayon pool.
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run `f` on a pool with this worker count. A dedicated pool is built for nonzero counts;
    /// if that fails, `f` runs on the global pool instead.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                tracing::warn!(workers = self.workers, error = %err, "falling back to global thread pool");
                f()
            }
        }
    }
}
