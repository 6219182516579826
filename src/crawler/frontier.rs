//! Crawl frontier: the shared work queue and claimed-address bookkeeping
//!
//! The frontier owns every piece of mutable traversal state:
//! - the set of addresses already claimed (claimed-or-done)
//! - the FIFO of in-scope addresses waiting to be fetched
//! - the number of claimed addresses whose worker has not finished yet
//! - the visit budget
//!
//! All of it sits behind one mutex so a claim is a single atomic step. A
//! [`Notify`] wakes idle workers whenever new work arrives or in-flight work
//! completes.

use crate::url::Origin;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use url::Url;

/// Outcome of asking the frontier for the next address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The caller now owns fetching this address
    Claimed(Url),

    /// Nothing claimable right now, but in-flight work may still add some
    Wait,

    /// The frontier is exhausted or the budget is spent
    Finished,
}

#[derive(Debug)]
struct FrontierState {
    visited: HashSet<String>,
    pending: VecDeque<Url>,
    in_flight: usize,
}

impl FrontierState {
    fn budget_reached(&self, budget: usize) -> bool {
        self.visited.len() >= budget
    }

    fn try_claim(&mut self, url: &Url, budget: usize) -> bool {
        if self.budget_reached(budget) || self.visited.contains(url.as_str()) {
            return false;
        }
        self.visited.insert(url.as_str().to_string());
        self.in_flight += 1;
        true
    }
}

/// Shared, concurrency-safe crawl frontier
#[derive(Debug)]
pub struct Frontier {
    origin: Origin,
    budget: usize,
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    /// Creates a frontier seeded with a single address
    ///
    /// # Arguments
    ///
    /// * `seed` - The normalized seed URL; its host becomes the crawl origin
    /// * `origin` - The origin derived from the seed
    /// * `budget` - Maximum number of addresses ever claimed
    pub fn new(seed: Url, origin: Origin, budget: usize) -> Self {
        let mut pending = VecDeque::new();
        if origin.contains(&seed) {
            pending.push_back(seed);
        }

        Self {
            origin,
            budget,
            state: Mutex::new(FrontierState {
                visited: HashSet::new(),
                pending,
                in_flight: 0,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // No code path panics while holding the lock, but a poisoned frontier
        // is still structurally valid
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the crawl origin
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Returns the visit budget
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Atomically claims an address for fetching
    ///
    /// Returns true if the address was not yet visited and the budget allowed
    /// one more claim; the caller must then fetch it and call [`complete`].
    ///
    /// [`complete`]: Frontier::complete
    pub fn try_claim(&self, url: &Url) -> bool {
        self.lock().try_claim(url, self.budget)
    }

    /// Adds a discovered address to the pending queue
    ///
    /// Out-of-scope and already-visited addresses are dropped, as is
    /// everything once the budget is spent. Returns true if the address was
    /// queued.
    pub fn enqueue(&self, url: Url) -> bool {
        if !self.origin.contains(&url) {
            tracing::trace!("Out of scope, not queued: {}", url);
            return false;
        }

        {
            let mut state = self.lock();
            if state.budget_reached(self.budget) || state.visited.contains(url.as_str()) {
                return false;
            }
            state.pending.push_back(url);
        }

        self.notify.notify_waiters();
        true
    }

    /// Pops one pending address without claiming it
    pub fn dequeue(&self) -> Option<Url> {
        self.lock().pending.pop_front()
    }

    /// Returns true when nothing is pending and no worker is in flight
    pub fn is_exhausted(&self) -> bool {
        let state = self.lock();
        state.pending.is_empty() && state.in_flight == 0
    }

    /// Returns true once the number of claims has hit the budget
    pub fn budget_reached(&self) -> bool {
        self.lock().budget_reached(self.budget)
    }

    /// Dequeues and claims the next address in one critical section
    ///
    /// Addresses that fail to claim (already visited) are discarded.
    pub fn next_claim(&self) -> Claim {
        let mut state = self.lock();

        loop {
            if state.budget_reached(self.budget) {
                return Claim::Finished;
            }

            match state.pending.pop_front() {
                Some(url) => {
                    if state.try_claim(&url, self.budget) {
                        return Claim::Claimed(url);
                    }
                    tracing::trace!("Already claimed, discarding: {}", url);
                }
                None if state.in_flight == 0 => return Claim::Finished,
                None => return Claim::Wait,
            }
        }
    }

    /// Waits for the next claimable address
    ///
    /// Returns `None` once the crawl is over: the frontier is exhausted or
    /// the budget is spent. Waiting workers are woken by [`enqueue`] and
    /// [`complete`].
    ///
    /// [`enqueue`]: Frontier::enqueue
    /// [`complete`]: Frontier::complete
    pub async fn next(&self) -> Option<Url> {
        loop {
            // Register interest before inspecting state so a notification
            // sent between the check and the await is not lost
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.next_claim() {
                Claim::Claimed(url) => return Some(url),
                Claim::Finished => {
                    self.notify.notify_waiters();
                    return None;
                }
                Claim::Wait => notified.await,
            }
        }
    }

    /// Marks one claimed address as fully processed
    ///
    /// Must be called exactly once per successful claim, after the worker has
    /// enqueued everything it discovered.
    pub fn complete(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    /// Number of addresses claimed so far
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Number of addresses waiting in the queue
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of claimed addresses still being processed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}
