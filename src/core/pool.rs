//! Worker pool and strip partitioning.
//!
//! Every parallel phase of the engine follows the same shape: partition an
//! index space into per-thread strips, push each strip's right boundary
//! forward to a safe split point, run the strips on the pool, and concatenate
//! the per-strip results in strip order. [`Pool`] wraps a fixed-size
//! [`rayon::ThreadPool`] and provides exactly that, so the ordering guarantee
//! lives in one place.
//!
//! Encoders take a `&Pool` explicitly. For callers that do not want to manage
//! one, [`default_pool`] lazily initializes a process-wide instance; the
//! first call decides its size, later size arguments are ignored.

use std::ops::Range;
use std::sync::OnceLock;

use rayon::prelude::*;

/// Pool size used when hardware concurrency cannot be determined.
const FALLBACK_THREADS: usize = 8;

/// Fixed-size worker pool.
///
/// Tasks run to completion without yielding; the only synchronization point
/// is the implicit barrier at the end of [`Pool::map_ordered`].
pub struct Pool {
    inner: rayon::ThreadPool,
    max_threads: usize,
}

impl Pool {
    /// Build a pool with `n_threads` workers. Zero selects the hardware
    /// concurrency, falling back to 8 when it cannot be queried.
    pub fn new(n_threads: usize) -> Self {
        let max_threads = if n_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_THREADS)
        } else {
            n_threads
        };
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()
            .expect("worker pool construction cannot fail with a plain size");
        Self { inner, max_threads }
    }

    /// Number of workers.
    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Run `op` inside the pool so that rayon iterators inside it use these
    /// workers rather than the global registry.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.inner.install(op)
    }

    /// Apply `task` to every strip in parallel and return the results in
    /// strip order. This is the submit-then-wait-all barrier of the engine:
    /// it does not return until every strip has completed.
    pub fn map_ordered<T, F>(&self, strips: Vec<Range<usize>>, task: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Range<usize>) -> T + Sync + Send,
    {
        self.inner
            .install(|| strips.into_par_iter().map(task).collect())
    }
}

/// Process-wide default pool.
///
/// Initialized on first use with the given size (0 = hardware concurrency);
/// the size argument of every later call is ignored.
pub fn default_pool(n_threads: usize) -> &'static Pool {
    static DEFAULT: OnceLock<Pool> = OnceLock::new();
    DEFAULT.get_or_init(|| Pool::new(n_threads))
}

/// Partition `0..total` into about `thread_count` strips, pushing each
/// strip's right boundary forward with `extend` until it is a safe split
/// point. `extend` receives a proposed boundary and must return a boundary
/// in `proposed..=total`.
pub fn strips<F>(total: usize, thread_count: usize, extend: F) -> Vec<Range<usize>>
where
    F: Fn(usize) -> usize,
{
    debug_assert!(thread_count > 0);
    let work_batch = total / thread_count + 1;
    let mut ranges = Vec::with_capacity(thread_count);
    let mut start = 0;
    while start < total {
        let mut end = total.min(start + work_batch);
        if end < total {
            end = extend(end);
        }
        ranges.push(start..end);
        start = end;
    }
    ranges
}
