//! Local Tasks - Single-threaded executor for in-flight submits.
//!
//! Submit futures are `!Send` and are polled on a thread-local
//! [`LocalPool`]. The mount loop drives the pool once per tick with
//! [`run_until_stalled`]; tests call it directly.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::pipeline::tasks;
//!
//! tasks::spawn(async { /* await a submit */ });
//! tasks::run_until_stalled();
//! ```

use std::cell::{Cell, RefCell};
use std::future::Future;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

thread_local! {
    static POOL: RefCell<LocalPool> = RefCell::new(LocalPool::new());
    static SPAWNER: RefCell<LocalSpawner> = POOL.with(|pool| RefCell::new(pool.borrow().spawner()));
    static PENDING: Cell<usize> = const { Cell::new(0) };
}

/// Queue a future on the local pool. It first runs on the next
/// [`run_until_stalled`]. Returns false if the pool refused it.
pub fn spawn<F>(future: F) -> bool
where
    F: Future<Output = ()> + 'static,
{
    let tracked = async move {
        future.await;
        PENDING.with(|p| p.set(p.get().saturating_sub(1)));
    };

    let spawned = SPAWNER.with(|spawner| spawner.borrow().spawn_local(tracked));
    match spawned {
        Ok(()) => {
            PENDING.with(|p| p.set(p.get() + 1));
            true
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to spawn local task");
            false
        }
    }
}

/// Poll every queued future until none can make progress.
///
/// Must not be called from inside a task.
pub fn run_until_stalled() {
    POOL.with(|pool| pool.borrow_mut().run_until_stalled());
}

/// Number of spawned futures that have not finished.
pub fn pending_tasks() -> usize {
    PENDING.with(|p| p.get())
}

/// Drop every queued future and start over (for testing).
pub fn reset_tasks() {
    let pool = LocalPool::new();
    SPAWNER.with(|spawner| *spawner.borrow_mut() = pool.spawner());
    POOL.with(|p| *p.borrow_mut() = pool);
    PENDING.with(|p| p.set(0));
}
