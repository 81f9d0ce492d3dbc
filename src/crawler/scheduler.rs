//! Scheduler for managing the crawl frontier and rate limiting
//!
//! This module handles:
//! - Priority queue management for pending requests
//! - Duplicate detection per (URL, extractor) pair
//! - Global concurrency limiting via a semaphore
//! - Respecting a minimum delay between dispatches

use crate::config::CrawlerConfig;
use crate::crawler::Request;
use crate::extract::ExtractorKind;
use crate::url::dedup_key;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Priority of the post-login home request
pub const PRIORITY_HOME: u32 = 0;

/// Priority of file and video fetches
pub const PRIORITY_ITEM: u32 = 5;

/// Priority of page fetches
pub const PRIORITY_PAGE: u32 = 10;

/// A request queued for fetching with priority information
#[derive(Debug, Clone)]
pub struct QueuedRequest {
    pub request: Request,

    /// Priority value (lower is higher priority)
    pub priority: u32,

    /// Insertion order, used to keep equal priorities FIFO
    sequence: u64,
}

// Lower priority values pop first from the BinaryHeap, then older entries
impl Ord for QueuedRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedRequest {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedRequest {}

/// Priority for a request, from its routing
pub fn priority_for(request: &Request) -> u32 {
    match request.extractor {
        None => PRIORITY_HOME,
        Some(ExtractorKind::File) | Some(ExtractorKind::Video) => PRIORITY_ITEM,
        Some(ExtractorKind::Page) => PRIORITY_PAGE,
    }
}

/// Scheduler manages the frontier queue and rate limiting
///
/// The scheduler coordinates:
/// - Global concurrency limits (max concurrent requests, shared with downloads)
/// - Politeness (minimum time between dispatches)
/// - Duplicate suppression
/// - Priority-based request selection from the frontier
pub struct Scheduler {
    /// Global semaphore for limiting concurrent network work
    global_semaphore: Arc<Semaphore>,

    /// Frontier priority queue of requests to fetch
    frontier: BinaryHeap<QueuedRequest>,

    /// (canonical URL, extractor) pairs already scheduled
    seen: HashSet<(String, Option<ExtractorKind>)>,

    /// Next insertion sequence number
    sequence: u64,

    /// Minimum time between dispatches
    download_delay: Duration,

    /// When the last request was dispatched
    last_dispatch: Option<Instant>,
}

impl Scheduler {
    /// Creates a new scheduler with an empty frontier
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            global_semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests as usize)),
            frontier: BinaryHeap::new(),
            seen: HashSet::new(),
            sequence: 0,
            download_delay: Duration::from_millis(config.download_delay),
            last_dispatch: None,
        }
    }

    /// Adds a request to the frontier
    ///
    /// A request whose (URL, extractor) pair was already scheduled is dropped
    /// unless it bypasses duplicate detection.
    ///
    /// # Returns
    ///
    /// `true` if the request was queued
    pub fn enqueue(&mut self, request: Request) -> bool {
        let key = (dedup_key(&request.url), request.extractor);
        let is_new = self.seen.insert(key);

        if !is_new && !request.bypass_dedup {
            tracing::trace!("Skipping duplicate: {}", request.url);
            return false;
        }

        let priority = priority_for(&request);
        self.frontier.push(QueuedRequest {
            request,
            priority,
            sequence: self.sequence,
        });
        self.sequence += 1;
        true
    }

    /// Removes and returns the highest priority request
    pub fn pop(&mut self) -> Option<Request> {
        self.frontier.pop().map(|queued| queued.request)
    }

    /// Takes a concurrency permit if one is free
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.global_semaphore.clone().try_acquire_owned().ok()
    }

    /// The concurrency semaphore, for work spawned outside the frontier
    pub fn semaphore(&self) -> Arc<Semaphore> {
        self.global_semaphore.clone()
    }

    /// Waits until the politeness delay since the last dispatch has elapsed
    ///
    /// Records the current instant as the new dispatch time.
    pub async fn wait_for_turn(&mut self) {
        if let Some(last) = self.last_dispatch {
            let elapsed = last.elapsed();
            if elapsed < self.download_delay {
                tokio::time::sleep(self.download_delay - elapsed).await;
            }
        }
        self.last_dispatch = Some(Instant::now());
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Number of distinct (URL, extractor) pairs scheduled so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
