//! Crawl frontier with budget, concurrency cap and rate limiting
//!
//! This module handles:
//! - FIFO queue of URLs waiting to be fetched
//! - Deduplication of every URL ever accepted
//! - The page budget (total URLs ever accepted, seed included)
//! - Global concurrency limiting via a semaphore
//! - A minimum interval between dispatches
//! - Drain detection: the queue is empty and nothing is in flight

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

#[derive(Debug, Default)]
struct FrontierState {
    /// Every URL ever accepted
    seen: HashSet<String>,

    /// URLs waiting to be dispatched
    queue: VecDeque<String>,

    /// Leases handed out and not yet dropped
    in_flight: usize,

    /// Next instant a dispatch is allowed
    next_dispatch: Option<Instant>,

    /// Set once the frontier has reported drain
    drained: bool,
}

/// Shared crawl frontier
///
/// Cloning yields another handle onto the same frontier, so fetch tasks can
/// enqueue the links they discover while the dispatcher keeps calling
/// [`Frontier::next`].
#[derive(Debug, Clone)]
pub struct Frontier {
    state: Arc<Mutex<FrontierState>>,
    permits: Arc<Semaphore>,
    changed: Arc<Notify>,
    budget: usize,
    rate_limit: Duration,
}

/// A dispatched URL
///
/// The URL counts as in flight until the lease is dropped.
#[derive(Debug)]
pub struct FrontierLease {
    url: String,
    frontier: Frontier,
    _permit: OwnedSemaphorePermit,
}

impl FrontierLease {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for FrontierLease {
    fn drop(&mut self) {
        self.frontier.lock().in_flight -= 1;
        self.frontier.changed.notify_one();
    }
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `budget` - Maximum number of URLs ever accepted
    /// * `max_concurrent` - Maximum number of leases outstanding at once
    /// * `rate_limit` - Minimum interval between two dispatches
    pub fn new(budget: usize, max_concurrent: usize, rate_limit: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(FrontierState::default())),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            changed: Arc::new(Notify::new()),
            budget,
            rate_limit,
        }
    }

    // Critical sections never panic, so a poisoned lock still guards a
    // consistent state.
    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers a URL to the frontier
    ///
    /// Returns `true` if the URL was accepted. A URL is rejected when it has
    /// been accepted before, when the budget is exhausted, or once the frontier
    /// has drained.
    pub fn enqueue(&self, url: &str) -> bool {
        let mut state = self.lock();
        if state.drained || state.seen.len() >= self.budget || state.seen.contains(url) {
            return false;
        }

        state.seen.insert(url.to_string());
        state.queue.push_back(url.to_string());
        drop(state);

        self.changed.notify_one();
        true
    }

    /// Waits for the next URL to fetch
    ///
    /// Returns `None` exactly when the queue is empty and no lease is
    /// outstanding. From then on the frontier stays drained.
    pub async fn next(&self) -> Option<FrontierLease> {
        loop {
            if self.lock().drained {
                return None;
            }

            let permit = self.permits.clone().acquire_owned().await.ok()?;

            let url = {
                let mut state = self.lock();
                match state.queue.pop_front() {
                    Some(url) => {
                        state.in_flight += 1;
                        Some(url)
                    }
                    None if state.in_flight == 0 => {
                        state.drained = true;
                        tracing::debug!("Frontier drained after {} URLs", state.seen.len());
                        return None;
                    }
                    None => None,
                }
            };

            match url {
                Some(url) => {
                    self.pace().await;
                    tracing::trace!("Dispatching {}", url);
                    return Some(FrontierLease {
                        url,
                        frontier: self.clone(),
                        _permit: permit,
                    });
                }
                None => {
                    // Something is in flight and may still enqueue links
                    drop(permit);
                    self.changed.notified().await;
                }
            }
        }
    }

    /// Sleeps until the next dispatch slot
    async fn pace(&self) {
        if self.rate_limit.is_zero() {
            return;
        }

        let wait = {
            let mut state = self.lock();
            let now = Instant::now();
            let slot = state.next_dispatch.map_or(now, |next| next.max(now));
            state.next_dispatch = Some(slot + self.rate_limit);
            slot - now
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Number of URLs ever accepted
    pub fn accepted(&self) -> usize {
        self.lock().seen.len()
    }

    /// Number of URLs waiting to be dispatched
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of outstanding leases
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}
