//! A queue that dequeues a pseudo-uniformly random element.
//!
//! # Copy-on-write
//!
//! [RandomQueue] holds at most one reference-counted handle to a [Ring]. Cloning a queue shares the
//! handle. Every mutation first checks whether the handle is uniquely held and, if not, replaces it
//! with a private copy of the ring (reserving any capacity the mutation needs in the same
//! allocation). Mutations of one queue are therefore never observed by its clones.
//!
//! An empty queue holds no ring. Operations that remove the last element release the ring; only
//! [SequenceMut::reserve] and [SequenceMut::remove_all] with `keep_capacity` leave an allocated,
//! empty ring behind.
//!
//! # Randomized dequeue
//!
//! [RandomQueue::enqueue_with] appends the new element and then swaps the head with the element at
//! an index drawn uniformly from `[0, len)`. [Queue::dequeue] removes the head. Each enqueue thus
//! leaves the head occupied by a candidate chosen uniformly among the elements present at that
//! moment, which makes both operations O(1) amortized. Consecutive dequeues without an enqueue in
//! between are not independent draws.
//!
//! Mutating operations require `T: Clone` because a shared ring must be copied before it is
//! changed.

use crate::{
    out_of_bounds,
    ring::Ring,
    sequence::{resolve, try_resolve},
    Error, Queue, QueueView, Sequence, SequenceMut,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error as CodecError, RangeCfg, Read, Write};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::{
    collections::{vec_deque, VecDeque},
    fmt,
    hash::{Hash, Hasher},
    iter::{self, FusedIterator},
    ops::{Index, IndexMut, Range, RangeBounds},
    rc::Rc,
};
use tracing::trace;

/// A copy-on-write queue whose [Queue::dequeue] returns a randomly chosen element.
pub struct RandomQueue<T> {
    storage: Option<Rc<Ring<T>>>,
}

impl<T> RandomQueue<T> {
    /// Creates an empty queue without allocating.
    pub const fn new() -> Self {
        Self { storage: None }
    }

    /// Creates a queue holding `elements` in random order, shuffled with `rng`.
    ///
    /// Shuffling on ingestion keeps the positional order of the input from leaking into the
    /// order elements are dequeued.
    pub fn from_iter_with<I, R>(elements: I, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = T>,
        R: Rng + ?Sized,
    {
        let mut elements: Vec<T> = elements.into_iter().collect();
        elements.shuffle(rng);
        Self::from_ring(Ring::from(elements))
    }

    /// Wraps `ring` without reordering it.
    pub(crate) fn from_ring(ring: Ring<T>) -> Self {
        if ring.is_empty() {
            return Self::new();
        }
        Self {
            storage: Some(Rc::new(ring)),
        }
    }

    /// Returns the number of elements in the queue.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.as_deref().map_or(0, Ring::len)
    }

    /// Returns `true` if the queue holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements the queue can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.as_deref().map_or(0, Ring::capacity)
    }

    /// Returns the number of additional elements the queue can hold without reallocating.
    #[inline]
    pub fn residual_capacity(&self) -> usize {
        self.storage.as_deref().map_or(0, Ring::residual_capacity)
    }

    /// Returns the element at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.storage.as_ref()?.get(index)
    }

    /// Returns the head of the queue (the next element to be dequeued), if any.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the last element, if any.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns an iterator over the elements in index order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.storage.as_deref().map(Ring::iter),
        }
    }

    /// Returns an iterator over the elements in `range`, which must be within `0..len`.
    pub(crate) fn range(&self, range: Range<usize>) -> Iter<'_, T> {
        Iter {
            inner: self.storage.as_deref().map(|storage| storage.range(range)),
        }
    }

    /// Returns the contents as two slices which, concatenated, hold every element in order.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        match &self.storage {
            Some(storage) => storage.as_slices(),
            None => (&[], &[]),
        }
    }

    /// Returns a view over the elements in `range`.
    ///
    /// The view holds its own copy of this queue: mutating one never affects the other.
    ///
    /// # Panics
    ///
    /// Panics if `range` is malformed or exceeds `len`.
    #[track_caller]
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> QueueView<T> {
        let bounds = resolve(range, self.len());
        QueueView::from_parts(self.clone(), bounds)
    }

    /// Returns a view over the elements in `range`, or an error if `range` is not within `0..len`.
    pub fn try_slice<R: RangeBounds<usize>>(&self, range: R) -> Result<QueueView<T>, Error> {
        let bounds = try_resolve(range, self.len())?;
        Ok(QueueView::from_parts(self.clone(), bounds))
    }

    /// Returns `true` if both queues currently share the same ring.
    pub(crate) fn shares_storage_with(&self, other: &Self) -> bool {
        match (&self.storage, &other.storage) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Returns how much capacity must be added to fit `growth` more elements.
    fn additional_capacity_needed(&self, growth: usize) -> usize {
        growth.saturating_sub(self.residual_capacity())
    }

    /// Releases the ring if the last mutation left it empty.
    fn release_if_empty(&mut self) {
        if self.storage.as_deref().is_some_and(Ring::is_empty) {
            trace!("releasing empty storage");
            self.storage = None;
        }
    }
}

impl<T: Clone> RandomQueue<T> {
    /// Creates a queue holding `count` copies of `value`.
    pub fn repeating(value: T, count: usize) -> Self {
        if count == 0 {
            return Self::new();
        }
        Self::from_ring(Ring::repeating(value, count))
    }

    /// Adds `element` to the queue, drawing the next head with `rng`.
    pub fn enqueue_with<R: Rng + ?Sized>(&mut self, element: T, rng: &mut R) {
        let additional = self.additional_capacity_needed(1);
        self.make_unique(additional).push_back(element);
        self.randomize_head(rng);
    }

    /// Adds every element of `elements` to the queue in random order, drawing the shuffle and the
    /// next head with `rng`.
    ///
    /// After the shuffled batch is appended, the head is redrawn once across the whole queue. The
    /// batch therefore competes for the head slot exactly like single enqueues, instead of leaving
    /// the previous head in place until the next single enqueue.
    pub fn enqueue_all_with<I, R>(&mut self, elements: I, rng: &mut R)
    where
        I: IntoIterator<Item = T>,
        R: Rng + ?Sized,
    {
        let mut elements: Vec<T> = elements.into_iter().collect();
        if elements.is_empty() {
            return;
        }
        elements.shuffle(rng);
        let additional = self.additional_capacity_needed(elements.len());
        self.make_unique(additional).append(elements);
        self.randomize_head(rng);
    }

    /// Returns the contents as one mutable slice, copying shared storage first.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.is_empty() {
            return &mut [];
        }
        self.make_unique(0).make_contiguous()
    }

    /// Swaps the head with an element chosen uniformly from the whole queue.
    fn randomize_head<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let len = self.len();
        if len < 2 {
            return;
        }
        let index = rng.gen_range(0..len);
        if index != 0 {
            self.make_unique(0).swap(0, index);
        }
    }

    /// Returns the ring for mutation, copying it first if it is shared.
    ///
    /// The returned ring has room for at least `additional` more elements beyond its residual
    /// capacity at the time of the call.
    fn make_unique(&mut self, additional: usize) -> &mut Ring<T> {
        let storage = match self.storage.take() {
            None => {
                trace!(additional, "allocating storage");
                Rc::new(Ring::with_capacity(additional))
            }
            Some(storage) if Rc::strong_count(&storage) > 1 => {
                trace!(len = storage.len(), additional, "copying shared storage");
                Rc::new(storage.copy(additional))
            }
            Some(mut storage) => {
                if let Some(ring) = Rc::get_mut(&mut storage) {
                    ring.reserve_capacity(additional);
                }
                storage
            }
        };

        // The handle is now unique, so this never clones
        Rc::make_mut(self.storage.insert(storage))
    }
}

impl<T: Clone> Queue for RandomQueue<T> {
    type Item = T;

    fn capacity(&self) -> usize {
        RandomQueue::capacity(self)
    }

    /// Returns `true` when there is no residual capacity, including when nothing is allocated.
    fn is_full(&self) -> bool {
        RandomQueue::capacity(self) == self.len()
    }

    fn peek(&self) -> Option<&T> {
        self.first()
    }

    fn dequeue(&mut self) -> Option<T> {
        self.pop_first()
    }

    fn enqueue(&mut self, element: T) {
        self.enqueue_with(element, &mut thread_rng());
    }

    fn enqueue_all<I: IntoIterator<Item = T>>(&mut self, elements: I) {
        self.enqueue_all_with(elements, &mut thread_rng());
    }
}

impl<T> Sequence for RandomQueue<T> {
    type Item = T;

    fn len(&self) -> usize {
        RandomQueue::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        RandomQueue::get(self, index)
    }
}

impl<T: Clone> SequenceMut for RandomQueue<T> {
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        self.make_unique(0).get_mut(index)
    }

    #[track_caller]
    fn splice<R, I>(&mut self, range: R, replace_with: I) -> Vec<T>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = T>,
    {
        let range = resolve(range, self.len());
        let mut elements = replace_with.into_iter().peekable();
        if range.is_empty() && elements.peek().is_none() {
            return Vec::new();
        }
        let growth = elements.size_hint().0.saturating_sub(range.len());
        let additional = self.additional_capacity_needed(growth);
        let removed = self.make_unique(additional).replace(range, elements);
        self.release_if_empty();
        removed
    }

    fn reserve(&mut self, additional: usize) {
        let additional = self.additional_capacity_needed(additional);
        if additional == 0 {
            return;
        }
        self.make_unique(additional);
    }

    fn push(&mut self, element: T) {
        let additional = self.additional_capacity_needed(1);
        self.make_unique(additional).push_back(element);
    }

    fn push_all<I: IntoIterator<Item = T>>(&mut self, elements: I) {
        let mut elements = elements.into_iter().peekable();
        if elements.peek().is_none() {
            return;
        }
        let additional = self.additional_capacity_needed(elements.size_hint().0);
        self.make_unique(additional).append(elements);
    }

    #[track_caller]
    fn insert(&mut self, index: usize, element: T) {
        let len = self.len();
        if index > len {
            out_of_bounds(index, len);
        }
        let additional = self.additional_capacity_needed(1);
        self.make_unique(additional)
            .insert_at(index, iter::once(element));
    }

    #[track_caller]
    fn insert_all<I: IntoIterator<Item = T>>(&mut self, index: usize, elements: I) {
        let len = self.len();
        if index > len {
            out_of_bounds(index, len);
        }
        let mut elements = elements.into_iter().peekable();
        if elements.peek().is_none() {
            return;
        }
        let additional = self.additional_capacity_needed(elements.size_hint().0);
        self.make_unique(additional).insert_at(index, elements);
    }

    #[track_caller]
    fn remove(&mut self, index: usize) -> T {
        let len = self.len();
        if index >= len {
            out_of_bounds(index, len);
        }
        match self.make_unique(0).remove(index, true) {
            Some(element) => {
                self.release_if_empty();
                element
            }
            None => out_of_bounds(index, len),
        }
    }

    #[track_caller]
    fn remove_range<R: RangeBounds<usize>>(&mut self, range: R) {
        let range = resolve(range, self.len());
        if range.is_empty() {
            return;
        }
        self.make_unique(0).remove_at(range.start, range.len(), false);
        self.release_if_empty();
    }

    #[track_caller]
    fn remove_first(&mut self) -> T {
        match self.pop_first() {
            Some(element) => element,
            None => panic!("cannot remove first element of an empty queue"),
        }
    }

    #[track_caller]
    fn remove_first_n(&mut self, k: usize) {
        let len = self.len();
        assert!(k <= len, "cannot remove {k} elements from length {len}");
        if k == 0 {
            return;
        }
        self.make_unique(0).remove_first(k, false);
        self.release_if_empty();
    }

    #[track_caller]
    fn remove_last(&mut self) -> T {
        match self.pop_last() {
            Some(element) => element,
            None => panic!("cannot remove last element of an empty queue"),
        }
    }

    #[track_caller]
    fn remove_last_n(&mut self, k: usize) {
        let len = self.len();
        assert!(k <= len, "cannot remove {k} elements from length {len}");
        if k == 0 {
            return;
        }
        self.make_unique(0).remove_last(k);
        self.release_if_empty();
    }

    fn pop_first(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let element = self.make_unique(0).pop_first();
        self.release_if_empty();
        element
    }

    fn pop_last(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let element = self.make_unique(0).pop_last();
        self.release_if_empty();
        element
    }

    fn remove_all(&mut self, keep_capacity: bool) {
        let Some(mut storage) = self.storage.take() else {
            return;
        };
        if !keep_capacity {
            return;
        }

        // A shared ring is left to its other owners rather than copied only to be cleared
        match Rc::get_mut(&mut storage) {
            Some(ring) => ring.remove_all(true),
            None => storage = Rc::new(Ring::with_capacity(storage.capacity())),
        }
        self.storage = Some(storage);
    }
}

impl<T> Default for RandomQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RandomQueue<T> {
    /// Returns a queue sharing this queue's storage until either is mutated.
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<T> FromIterator<T> for RandomQueue<T> {
    /// Collects the elements in random order (see [RandomQueue::from_iter_with]).
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_with(iter, &mut thread_rng())
    }
}

impl<T: Clone> Extend<T> for RandomQueue<T> {
    /// Appends the elements in order, without touching the head (see [Queue::enqueue_all] for the
    /// randomized equivalent).
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.push_all(iter);
    }
}

impl<T> Index<usize> for RandomQueue<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(element) => element,
            None => out_of_bounds(index, self.len()),
        }
    }
}

impl<T: Clone> IndexMut<usize> for RandomQueue<T> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let len = self.len();
        match self.get_mut(index) {
            Some(element) => element,
            None => out_of_bounds(index, len),
        }
    }
}

impl<T: PartialEq> PartialEq for RandomQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.shares_storage_with(other) {
            return true;
        }
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RandomQueue<T> {}

impl<T: PartialEq> PartialEq<[T]> for RandomQueue<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for RandomQueue<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        *self == other[..]
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for RandomQueue<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == other[..]
    }
}

impl<T: Hash> Hash for RandomQueue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self.iter() {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RandomQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// ---------- Iterators ----------

/// Iterator over the elements of a [RandomQueue] or [QueueView], in index order.
pub struct Iter<'a, T> {
    inner: Option<vec_deque::Iter<'a, T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner
            .as_ref()
            .map_or((0, Some(0)), |inner| inner.size_hint())
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Owning iterator over the elements of a [RandomQueue], in index order.
pub struct IntoIter<T> {
    inner: vec_deque::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: Clone> IntoIterator for RandomQueue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Moves the elements out of the ring, copying them only if the ring is shared.
    fn into_iter(self) -> Self::IntoIter {
        let buffer = match self.storage {
            Some(storage) => Rc::unwrap_or_clone(storage).into_inner(),
            None => VecDeque::new(),
        };
        IntoIter {
            inner: buffer.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a RandomQueue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------- Codec ----------

impl<T: Write> Write for RandomQueue<T> {
    fn write(&self, buf: &mut impl BufMut) {
        // Same layout as a `Vec<T>` holding the elements in index order
        self.len().write(buf);
        for element in self.iter() {
            element.write(buf);
        }
    }
}

impl<T: EncodeSize> EncodeSize for RandomQueue<T> {
    fn encode_size(&self) -> usize {
        self.len().encode_size() + self.iter().map(EncodeSize::encode_size).sum::<usize>()
    }
}

impl<T: Read> Read for RandomQueue<T> {
    type Cfg = (RangeCfg, T::Cfg);

    fn read_cfg(buf: &mut impl Buf, (range, cfg): &Self::Cfg) -> Result<Self, CodecError> {
        let len = usize::read_cfg(buf, range)?;
        let mut ring = Ring::with_capacity(len);
        for _ in 0..len {
            ring.push_back(T::read_cfg(buf, cfg)?);
        }

        // Decoding restores the encoded order, including the head
        Ok(Self::from_ring(ring))
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::RandomQueue;
    use crate::ring::Ring;
    use serde::{ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};

    struct Elements<'a, T>(&'a RandomQueue<T>);

    impl<T: Serialize> Serialize for Elements<'_, T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.0.iter())
        }
    }

    impl<T: Serialize> Serialize for RandomQueue<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("RandomQueue", 1)?;
            state.serialize_field("storage", &Elements(self))?;
            state.end()
        }
    }

    #[derive(Deserialize)]
    #[serde(rename = "RandomQueue", deny_unknown_fields)]
    struct Repr<T> {
        storage: Vec<T>,
    }

    impl<'de, T: Deserialize<'de>> Deserialize<'de> for RandomQueue<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let Repr { storage } = Repr::deserialize(deserializer)?;
            Ok(Self::from_ring(Ring::from(storage)))
        }
    }
}
