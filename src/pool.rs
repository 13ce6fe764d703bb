//! Bounded worker pool draining a shared task queue.
//!
//! Workers suspend only while their current child process runs, so the pool
//! uses plain OS threads: one logical worker per thread, all popping the
//! same FIFO queue until it is empty.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::invoke::{Invoker, Task, TaskResult};

/// Hard ceiling on concurrent workers, regardless of host CPU count.
pub const MAX_WORKERS: usize = 8;

/// Runs every task with at most `workers` concurrent processes and returns
/// results positionally aligned with the input order.
///
/// The queue is a shared atomic cursor over the task slice; each worker
/// pops the next index until the slice is exhausted. Completion order
/// across workers is non-deterministic, but each slot in the returned
/// vector corresponds to the task at the same input index.
///
/// `on_progress` fires exactly once per task, after it completes (success
/// or failure), with a monotonically increasing completed count. A task
/// whose process cannot start yields a synthetic failed result from the
/// invoker and does not disturb its siblings.
pub fn run_pool<F>(tasks: &[Task], invoker: &Invoker, workers: usize, on_progress: &F) -> Vec<TaskResult>
where
    F: Fn(usize, usize) + Sync,
{
    let total = tasks.len();
    if total == 0 {
        return Vec::new();
    }

    // Single task: skip the pool machinery entirely.
    if total == 1 {
        let result = invoker.run(&tasks[0]);
        on_progress(1, 1);
        return vec![result];
    }

    let worker_count = workers.clamp(1, MAX_WORKERS).min(total);
    let cursor = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);

    let mut indexed: Vec<(usize, TaskResult)> = Vec::with_capacity(total);
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            handles.push(scope.spawn(|| {
                let mut local = Vec::new();
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= total {
                        break;
                    }
                    let result = invoker.run(&tasks[index]);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    on_progress(done, total);
                    local.push((index, result));
                }
                local
            }));
        }
        for handle in handles {
            if let Ok(local) = handle.join() {
                indexed.extend(local);
            }
        }
    });

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
}
