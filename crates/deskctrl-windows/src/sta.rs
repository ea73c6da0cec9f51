//! Run blocking UIA work on a dedicated apartment-bound worker thread.
//!
//! COM accessibility objects are apartment-affine: they must be created and
//! used on the same thread. Each resolution call spins up its own
//! short-lived worker, runs the blocking native work there, and hands the
//! result back over a channel — calls never share an apartment thread, so
//! concurrent calls cannot interfere through COM state.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

/// Run `f` to completion on a fresh worker thread and return its result.
pub fn run<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("deskctrl-uia".into())
        .spawn(move || {
            let _ = tx.send(f());
        })
        .context("failed to spawn UIA worker thread")?;

    let result = rx
        .recv()
        .map_err(|_| anyhow!("UIA worker thread terminated without a result"))?;
    let _ = handle.join();
    result
}

/// Like [`run`], but give up waiting after `deadline`.
///
/// On timeout the worker is left to finish (and be discarded) on its own;
/// there is no way to safely cancel a blocking COM call mid-flight.
pub fn run_with_deadline<T, F>(f: F, deadline: Duration) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("deskctrl-uia".into())
        .spawn(move || {
            let _ = tx.send(f());
        })
        .context("failed to spawn UIA worker thread")?;

    match rx.recv_timeout(deadline) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(anyhow!("UIA worker exceeded deadline of {deadline:?}"))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(anyhow!("UIA worker thread terminated without a result"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_closure_result() {
        let out = run(|| Ok(21 * 2)).unwrap();
        assert_eq!(out, 42);
    }

    #[test]
    fn propagates_closure_error() {
        let out: Result<()> = run(|| Err(anyhow!("boom")));
        assert!(out.unwrap_err().to_string().contains("boom"));
    }

    #[test]
    fn deadline_elapses_on_stuck_work() {
        let out: Result<()> = run_with_deadline(
            || {
                thread::sleep(Duration::from_secs(5));
                Ok(())
            },
            Duration::from_millis(50),
        );
        assert!(out.unwrap_err().to_string().contains("deadline"));
    }

    #[test]
    fn worker_panic_is_an_error_not_a_crash() {
        let out: Result<()> = run(|| panic!("worker died"));
        assert!(out.is_err());
    }
}
