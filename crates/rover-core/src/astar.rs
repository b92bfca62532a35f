//! Graph-agnostic A* search.
//!
//! The search works over any node type whose graph can enumerate neighbours.
//! Candidate paths are persistent backward-linked lists: extending a path
//! never copies it, and paths with a common prefix share that prefix.

use crate::error::SearchError;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A graph that can list the nodes reachable in one step from `node`.
///
/// Takes `&mut self` so implementations may materialize nodes lazily.
pub trait Neighbours<N> {
    fn neighbours(&mut self, node: &N) -> Vec<N>;
}

/// Immutable search path, linked from the last step back to the start.
#[derive(Debug)]
pub struct Path<N> {
    last_step: N,
    previous_steps: Option<Arc<Path<N>>>,
    total_cost: f64,
}

impl<N> Path<N> {
    /// A zero-cost path containing only `start`.
    pub fn new(start: N) -> Arc<Self> {
        Arc::new(Self {
            last_step: start,
            previous_steps: None,
            total_cost: 0.0,
        })
    }

    /// Extend this path by one step. Negative costs are treated as zero so
    /// the total never decreases.
    pub fn add_step(self: &Arc<Self>, step: N, step_cost: f64) -> Arc<Self> {
        Arc::new(Self {
            last_step: step,
            previous_steps: Some(Arc::clone(self)),
            total_cost: self.total_cost + step_cost.max(0.0),
        })
    }

    pub fn last_step(&self) -> &N {
        &self.last_step
    }

    pub fn previous_steps(&self) -> Option<&Arc<Path<N>>> {
        self.previous_steps.as_ref()
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Steps from the last one back to the start.
    pub fn iter(&self) -> PathIter<'_, N> {
        PathIter { next: Some(self) }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

pub struct PathIter<'a, N> {
    next: Option<&'a Path<N>>,
}

impl<'a, N> Iterator for PathIter<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous_steps.as_deref();
        Some(&current.last_step)
    }
}

impl<'a, N> IntoIterator for &'a Path<N> {
    type Item = &'a N;
    type IntoIter = PathIter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Total order over `f64` for use as a priority key.
#[derive(Debug, Clone, Copy)]
pub struct FloatOrd(pub f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Min-priority multimap, FIFO among equal priorities.
#[derive(Debug)]
pub struct PriorityQueue<P, V> {
    buckets: BTreeMap<P, VecDeque<V>>,
    len: usize,
}

impl<P: Ord, V> PriorityQueue<P, V> {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn enqueue(&mut self, priority: P, value: V) {
        self.buckets.entry(priority).or_default().push_back(value);
        self.len += 1;
    }

    /// Remove the oldest entry with the lowest priority.
    pub fn dequeue(&mut self) -> Option<V> {
        let mut bucket = self.buckets.first_entry()?;
        let value = bucket.get_mut().pop_front();
        if bucket.get().is_empty() {
            bucket.remove();
        }
        if value.is_some() {
            self.len -= 1;
        }
        value
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<P: Ord, V> Default for PriorityQueue<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides when a running search must give up. Checked once per expansion,
/// and once per tile while the pathfinder seeds its destination.
pub trait SearchBudget {
    fn exhausted(&mut self) -> bool;
}

/// Never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl SearchBudget for Unbounded {
    fn exhausted(&mut self) -> bool {
        false
    }
}

/// Allows a fixed number of budget checks. Deterministic, handy in tests.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionLimit(pub usize);

impl SearchBudget for ExpansionLimit {
    fn exhausted(&mut self) -> bool {
        if self.0 == 0 {
            return true;
        }
        self.0 -= 1;
        false
    }
}

/// Source of monotonic time for [`Deadline`].
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Wall-clock budget against an injectable clock.
#[derive(Debug, Clone)]
pub struct Deadline<C = SystemClock> {
    clock: C,
    expires_at: Instant,
}

impl Deadline<SystemClock> {
    pub fn after(budget: Duration) -> Self {
        Self::with_clock(SystemClock, budget)
    }
}

impl<C: Clock> Deadline<C> {
    pub fn with_clock(clock: C, budget: Duration) -> Self {
        let expires_at = clock.now() + budget;
        Self { clock, expires_at }
    }
}

impl<C: Clock> SearchBudget for Deadline<C> {
    fn exhausted(&mut self) -> bool {
        self.clock.now() >= self.expires_at
    }
}

/// Find the cheapest path from `start` to `destination`.
///
/// The frontier is keyed by cost-so-far plus `estimate`. A node may be queued
/// more than once; only its first (cheapest) dequeue is expanded.
pub fn find_path<N, G, D, E, B>(
    graph: &mut G,
    start: N,
    destination: &N,
    distance: D,
    estimate: E,
    budget: &mut B,
) -> Result<Arc<Path<N>>, SearchError>
where
    N: Clone + Eq + Hash,
    G: Neighbours<N> + ?Sized,
    D: Fn(&N, &N) -> f64,
    E: Fn(&N) -> f64,
    B: SearchBudget + ?Sized,
{
    let mut closed: HashSet<N> = HashSet::new();
    let mut queue: PriorityQueue<FloatOrd, Arc<Path<N>>> = PriorityQueue::new();
    queue.enqueue(FloatOrd(0.0), Path::new(start));
    let mut expanded = 0usize;

    while let Some(path) = queue.dequeue() {
        if closed.contains(path.last_step()) {
            continue;
        }
        if path.last_step() == destination {
            return Ok(path);
        }
        if budget.exhausted() {
            return Err(SearchError::BudgetElapsed { expanded });
        }

        let current = path.last_step().clone();
        expanded += 1;
        for neighbour in graph.neighbours(&current) {
            if closed.contains(&neighbour) {
                continue;
            }
            let step_cost = distance(&current, &neighbour);
            let next = path.add_step(neighbour, step_cost);
            let priority = next.total_cost() + estimate(next.last_step());
            queue.enqueue(FloatOrd(priority), next);
        }
        closed.insert(current);
    }

    Err(SearchError::Exhausted)
}
