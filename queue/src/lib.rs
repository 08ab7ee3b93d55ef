//! Dequeue a pseudo-uniformly random element in O(1) amortized time.
//!
//! # Overview
//!
//! [RandomQueue] is a queue whose removal operation returns an element chosen at random from the
//! elements it currently holds, rather than the oldest (FIFO) or the highest priority one. It is
//! useful wherever insertion order must not bias which element leaves next (anti-starvation
//! scheduling, randomized simulation, fairness-sensitive worklists).
//!
//! Each enqueue appends the new element and then swaps the head with an element drawn uniformly
//! from the whole queue. Dequeue is a plain head removal. This keeps both operations O(1)
//! amortized, at the cost of exact uniformity: the head is a fresh candidate among the elements
//! present at the last insertion, not an independent draw over the full history. Do not rely on it
//! for anything requiring cryptographic or statistically exact sampling.
//!
//! [RandomQueue] is a value type with copy-on-write storage: cloning is cheap and the backing
//! [Ring] is only duplicated when a shared instance is mutated. [QueueView] presents the same
//! interface over a contiguous sub-range of a queue.
//!
//! # Example
//!
//! ```
//! use random_queue::{Queue, RandomQueue};
//!
//! let mut queue = RandomQueue::new();
//! for i in 0..10 {
//!     queue.enqueue(i);
//! }
//!
//! let mut drained = Vec::new();
//! while let Some(item) = queue.dequeue() {
//!     drained.push(item);
//! }
//! drained.sort();
//! assert_eq!(drained, (0..10).collect::<Vec<_>>());
//! assert!(queue.is_empty());
//! ```
//!
//! # Status
//!
//! `random-queue` is **ALPHA** software and is not yet recommended for production use. Developers
//! should expect breaking changes and occasional instability.

mod error;
pub use error::Error;
mod random_queue;
pub use random_queue::{IntoIter, Iter, RandomQueue};
pub mod ring;
pub use ring::Ring;
mod sequence;
pub use sequence::{Elements, Sequence, SequenceMut};
mod view;
pub use view::QueueView;

/// A queue that is usable without knowledge of its concrete storage.
pub trait Queue {
    /// The type of element held by the queue.
    type Item;

    /// Returns the number of elements the queue can hold without reallocating.
    fn capacity(&self) -> usize;

    /// Returns `true` if the next enqueue requires the queue to grow.
    fn is_full(&self) -> bool;

    /// Returns the element that would be removed by the next [Queue::dequeue], if any.
    fn peek(&self) -> Option<&Self::Item>;

    /// Removes and returns the next element, or `None` if the queue is empty.
    fn dequeue(&mut self) -> Option<Self::Item>;

    /// Adds an element to the queue.
    fn enqueue(&mut self, element: Self::Item);

    /// Adds every element of `elements` to the queue.
    fn enqueue_all<I: IntoIterator<Item = Self::Item>>(&mut self, elements: I);
}

/// Panics with a uniform message for an index outside `[0, len)`.
#[cold]
#[track_caller]
pub(crate) fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index {index} out of bounds for length {len}")
}
