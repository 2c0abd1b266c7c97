//! One-shot latch that orders book deltas after the first snapshot.
//!
//! The gate starts closed. [`SnapshotGate::open`] releases every waiter and
//! all later calls to [`SnapshotGate::wait`] return immediately. It never
//! closes again.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Single-fire latch with explicit wait and open operations.
#[derive(Debug, Default)]
pub struct SnapshotGate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl SnapshotGate {
    /// Creates a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the gate and wakes all waiters.
    ///
    /// Returns true if this call opened it, false if it was already open.
    pub fn open(&self) -> bool {
        let mut open = self.open.lock();
        if *open {
            return false;
        }
        *open = true;
        self.opened.notify_all();
        true
    }

    /// Returns true once the gate has been opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.open.lock()
    }

    /// Blocks the calling thread until the gate is open.
    ///
    /// There is no timeout: a gate that is never opened blocks forever.
    pub fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.opened.wait(&mut open);
        }
    }

    /// Blocks until the gate is open or `timeout` elapses.
    ///
    /// Returns true if the gate is open on return.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut open = self.open.lock();
        if *open {
            return true;
        }
        // Spurious wakeups are absorbed by the result re-check.
        let _ = self
            .opened
            .wait_while_for(&mut open, |open| !*open, timeout);
        *open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn new_gate_is_closed() {
        let gate = SnapshotGate::new();
        assert!(!gate.is_open());
        assert!(!gate.wait_for(Duration::from_millis(5)));
    }

    #[test]
    fn open_is_single_fire() {
        let gate = SnapshotGate::new();
        assert!(gate.open());
        assert!(!gate.open());
        assert!(gate.is_open());
    }

    #[test]
    fn wait_returns_immediately_when_open() {
        let gate = SnapshotGate::new();
        gate.open();
        gate.wait();
        assert!(gate.wait_for(Duration::ZERO));
    }

    #[test]
    fn open_releases_blocked_waiters() {
        let gate = Arc::new(SnapshotGate::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    gate.wait();
                    gate.is_open()
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        gate.open();

        for waiter in waiters {
            assert!(waiter.join().unwrap());
        }
    }

    #[test]
    fn wait_for_observes_open_from_other_thread() {
        let gate = Arc::new(SnapshotGate::new());
        let opener = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                gate.open();
            })
        };

        assert!(gate.wait_for(Duration::from_secs(5)));
        opener.join().unwrap();
    }
}
