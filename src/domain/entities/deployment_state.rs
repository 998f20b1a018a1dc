//! Deployment state - the single-flight lock and counters
//!
//! One instance per orchestrator. The lock is taken with a single
//! compare-and-set, so two triggers can never both observe "idle".
//! Release happens through [`DeploymentLease`], which also bumps the
//! deployment counter and records the elapsed time. Dropping a lease
//! without calling [`DeploymentLease::complete`] still releases it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct DeploymentState {
    deploying: AtomicBool,
    completed: AtomicU64,
    last_duration: Mutex<Duration>,
}

impl DeploymentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the locked region. Returns `None` when a deployment is already
    /// in flight.
    pub fn try_acquire(&self) -> Option<DeploymentLease<'_>> {
        self.deploying
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DeploymentLease {
                state: self,
                started: Instant::now(),
                released: false,
            })
    }

    pub fn is_deploying(&self) -> bool {
        self.deploying.load(Ordering::Acquire)
    }

    /// Number of deployments that have finished, successful or not.
    pub fn deployment_count(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    pub fn last_duration(&self) -> Duration {
        *self
            .last_duration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self, elapsed: Duration) -> u64 {
        *self
            .last_duration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = elapsed;
        let sequence = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        self.deploying.store(false, Ordering::Release);
        sequence
    }
}

/// Proof that the caller holds the deployment lock.
#[derive(Debug)]
pub struct DeploymentLease<'a> {
    state: &'a DeploymentState,
    started: Instant,
    released: bool,
}

impl DeploymentLease<'_> {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Release the lock, returning the deployment sequence number and the
    /// time spent inside the locked region.
    pub fn complete(mut self) -> (u64, Duration) {
        let elapsed = self.started.elapsed();
        self.released = true;
        (self.state.release(elapsed), elapsed)
    }
}

impl Drop for DeploymentLease<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.state.release(self.started.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn second_acquire_fails_while_held() {
        let state = DeploymentState::new();
        let lease = state.try_acquire().unwrap();
        assert!(state.is_deploying());
        assert!(state.try_acquire().is_none());
        let (sequence, _) = lease.complete();
        assert_eq!(sequence, 1);
        assert!(!state.is_deploying());
        assert!(state.try_acquire().is_some());
    }

    #[test]
    fn dropping_lease_releases_and_counts() {
        let state = DeploymentState::new();
        {
            let _lease = state.try_acquire().unwrap();
        }
        assert!(!state.is_deploying());
        assert_eq!(state.deployment_count(), 1);
    }

    #[test]
    fn lease_released_when_holder_panics() {
        let state = Arc::new(DeploymentState::new());
        let inner = state.clone();
        let result = thread::spawn(move || {
            let _lease = inner.try_acquire().unwrap();
            panic!("pipeline crashed");
        })
        .join();
        assert!(result.is_err());
        assert!(!state.is_deploying());
        assert_eq!(state.deployment_count(), 1);
    }

    #[test]
    fn complete_records_duration() {
        let state = DeploymentState::new();
        let lease = state.try_acquire().unwrap();
        thread::sleep(Duration::from_millis(5));
        let (_, elapsed) = lease.complete();
        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(state.last_duration(), elapsed);
    }

    #[test]
    fn concurrent_acquire_has_single_winner() {
        let state = Arc::new(DeploymentState::new());
        let barrier = Arc::new(Barrier::new(16));
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let state = state.clone();
                let barrier = barrier.clone();
                let winners = winners.clone();
                thread::spawn(move || {
                    barrier.wait();
                    if let Some(lease) = state.try_acquire() {
                        winners.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        lease.complete();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst) as u64, state.deployment_count());
        assert!(winners.load(Ordering::SeqCst) >= 1);
        assert!(!state.is_deploying());
    }
}
