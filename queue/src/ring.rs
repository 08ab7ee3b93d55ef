//! Growable ring buffer backing [crate::RandomQueue].
//!
//! [Ring] exposes the storage operations the queue consumes: O(1) amortized insertion and removal
//! at both ends, O(1) random access, capacity introspection, range replacement, and
//! [Ring::copy] for copy-on-write. Wraparound addressing and growth are delegated to
//! [VecDeque].
//!
//! Removals that do not ask to keep capacity release memory once the buffer falls below a quarter
//! of its capacity. Single-element pops never shrink, and [crate::RandomQueue] keeps capacity for
//! every single-element removal, so alternating insertions and removals do not thrash the
//! allocator.

use std::{
    collections::{vec_deque, VecDeque},
    ops::{Index, IndexMut, Range},
};

/// Capacity at or below which a buffer is never shrunk.
const MIN_SHRINK_CAPACITY: usize = 16;

/// A buffer is shrunk once its length is at most `capacity / SHRINK_FACTOR`.
const SHRINK_FACTOR: usize = 4;

/// A growable ring buffer.
#[derive(Clone, Debug, Default)]
pub struct Ring<T> {
    buffer: VecDeque<T>,
}

impl<T> Ring<T> {
    /// Creates an empty ring without allocating.
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
        }
    }

    /// Creates an empty ring able to hold at least `capacity` elements without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns the number of elements in the ring.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the ring holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the number of elements the ring can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Returns the number of additional elements the ring can hold without reallocating.
    #[inline]
    pub fn residual_capacity(&self) -> usize {
        self.buffer.capacity() - self.buffer.len()
    }

    /// Returns the element at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.buffer.get(index)
    }

    /// Returns a mutable reference to the element at `index`, if any.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.buffer.get_mut(index)
    }

    /// Swaps the elements at `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.buffer.swap(i, j);
    }

    /// Returns an iterator over all elements, front to back.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.buffer.iter()
    }

    /// Returns an iterator over the elements in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not within `0..len`.
    pub fn range(&self, range: Range<usize>) -> vec_deque::Iter<'_, T> {
        self.buffer.range(range)
    }

    /// Returns the contents as two slices which, concatenated, hold every element in order.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        self.buffer.as_slices()
    }

    /// Rearranges the storage so every element is in one slice, and returns it.
    pub fn make_contiguous(&mut self) -> &mut [T] {
        self.buffer.make_contiguous()
    }

    /// Appends an element at the back.
    pub fn push_back(&mut self, element: T) {
        self.buffer.push_back(element);
    }

    /// Appends every element of `elements` at the back, in order.
    pub fn append<I: IntoIterator<Item = T>>(&mut self, elements: I) {
        self.buffer.extend(elements);
    }

    /// Inserts `elements` so the first of them ends up at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_at<I: IntoIterator<Item = T>>(&mut self, index: usize, elements: I) {
        let len = self.buffer.len();
        assert!(index <= len, "insertion index {index} exceeds length {len}");
        if index == len {
            self.buffer.extend(elements);
            return;
        }
        if index == 0 {
            // Prepend in reverse so the ring never has to shift its existing elements
            let front: Vec<T> = elements.into_iter().collect();
            self.buffer.reserve(front.len());
            for element in front.into_iter().rev() {
                self.buffer.push_front(element);
            }
            return;
        }
        let mut tail = self.buffer.split_off(index);
        self.buffer.extend(elements);
        self.buffer.append(&mut tail);
    }

    /// Removes and returns the element at `index`, if any.
    pub fn remove(&mut self, index: usize, keep_capacity: bool) -> Option<T> {
        let removed = self.buffer.remove(index);
        if !keep_capacity {
            self.shrink();
        }
        removed
    }

    /// Removes `count` elements starting at `index` and returns them in order.
    ///
    /// # Panics
    ///
    /// Panics if `index + count > len`.
    pub fn remove_at(&mut self, index: usize, count: usize, keep_capacity: bool) -> Vec<T> {
        let end = index
            .checked_add(count)
            .filter(|end| *end <= self.buffer.len())
            .unwrap_or_else(|| {
                panic!(
                    "cannot remove {count} elements at {index} from length {}",
                    self.buffer.len()
                )
            });
        let removed = self.buffer.drain(index..end).collect();
        if !keep_capacity {
            self.shrink();
        }
        removed
    }

    /// Removes the first `k` elements.
    ///
    /// # Panics
    ///
    /// Panics if `k > len`.
    pub fn remove_first(&mut self, k: usize, keep_capacity: bool) {
        let len = self.buffer.len();
        assert!(k <= len, "cannot remove {k} elements from length {len}");
        self.buffer.drain(..k);
        if !keep_capacity {
            self.shrink();
        }
    }

    /// Removes the last `k` elements.
    ///
    /// # Panics
    ///
    /// Panics if `k > len`.
    pub fn remove_last(&mut self, k: usize) {
        let len = self.buffer.len();
        assert!(k <= len, "cannot remove {k} elements from length {len}");
        self.buffer.truncate(len - k);
    }

    /// Removes and returns the first element, if any.
    #[inline]
    pub fn pop_first(&mut self) -> Option<T> {
        self.buffer.pop_front()
    }

    /// Removes and returns the last element, if any.
    #[inline]
    pub fn pop_last(&mut self) -> Option<T> {
        self.buffer.pop_back()
    }

    /// Replaces the elements in `range` with `elements` and returns the replaced ones in order.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not within `0..len`.
    pub fn replace<I: IntoIterator<Item = T>>(
        &mut self,
        range: Range<usize>,
        elements: I,
    ) -> Vec<T> {
        let start = range.start;
        let removed = self.remove_at(start, range.len(), true);
        self.insert_at(start, elements);
        removed
    }

    /// Removes every element, optionally keeping the allocation.
    pub fn remove_all(&mut self, keep_capacity: bool) {
        if keep_capacity {
            self.buffer.clear();
        } else {
            self.buffer = VecDeque::new();
        }
    }

    /// Grows the capacity by at least `additional` elements beyond the current residual capacity.
    pub fn reserve_capacity(&mut self, additional: usize) {
        if additional == 0 {
            return;
        }
        self.buffer.reserve(self.residual_capacity() + additional);
    }

    /// Consumes the ring, returning the underlying buffer.
    pub fn into_inner(self) -> VecDeque<T> {
        self.buffer
    }

    fn shrink(&mut self) {
        let capacity = self.buffer.capacity();
        if capacity <= MIN_SHRINK_CAPACITY {
            return;
        }
        let len = self.buffer.len();
        if len <= capacity / SHRINK_FACTOR {
            self.buffer.shrink_to(len * 2);
        }
    }
}

impl<T: Clone> Ring<T> {
    /// Creates a ring holding `count` copies of `value`.
    pub fn repeating(value: T, count: usize) -> Self {
        Self {
            buffer: VecDeque::from(vec![value; count]),
        }
    }

    /// Returns an independent copy whose capacity exceeds this one's by at least `additional`.
    pub fn copy(&self, additional: usize) -> Self {
        let mut buffer = VecDeque::with_capacity(self.buffer.capacity() + additional);
        buffer.extend(self.buffer.iter().cloned());
        Self { buffer }
    }
}

impl<T> From<Vec<T>> for Ring<T> {
    fn from(elements: Vec<T>) -> Self {
        Self {
            buffer: VecDeque::from(elements),
        }
    }
}

impl<T> FromIterator<T> for Ring<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            buffer: iter.into_iter().collect(),
        }
    }
}

impl<T> Index<usize> for Ring<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.buffer.get(index) {
            Some(element) => element,
            None => crate::out_of_bounds(index, self.buffer.len()),
        }
    }
}

impl<T> IndexMut<usize> for Ring<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let len = self.buffer.len();
        match self.buffer.get_mut(index) {
            Some(element) => element,
            None => crate::out_of_bounds(index, len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents<T: Clone>(ring: &Ring<T>) -> Vec<T> {
        ring.iter().cloned().collect()
    }

    #[test]
    fn test_constructors() {
        let ring = Ring::<u8>::new();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 0);
        assert_eq!(ring.residual_capacity(), 0);

        let ring = Ring::<u8>::with_capacity(10);
        assert!(ring.is_empty());
        assert!(ring.capacity() >= 10);
        assert_eq!(ring.residual_capacity(), ring.capacity());

        let ring = Ring::repeating(7u8, 3);
        assert_eq!(contents(&ring), vec![7, 7, 7]);

        let ring = Ring::from(vec![1, 2, 3]);
        assert_eq!(contents(&ring), vec![1, 2, 3]);

        let ring: Ring<_> = (1..=4).collect();
        assert_eq!(contents(&ring), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_insert_at() {
        let mut ring = Ring::from(vec![1, 2, 3]);

        // Front
        ring.insert_at(0, [10, 11]);
        assert_eq!(contents(&ring), vec![10, 11, 1, 2, 3]);

        // Middle
        ring.insert_at(3, [20]);
        assert_eq!(contents(&ring), vec![10, 11, 1, 20, 2, 3]);

        // Back
        ring.insert_at(6, [30, 31]);
        assert_eq!(contents(&ring), vec![10, 11, 1, 20, 2, 3, 30, 31]);

        // Nothing
        ring.insert_at(2, []);
        assert_eq!(ring.len(), 8);
    }

    #[test]
    #[should_panic(expected = "insertion index 4 exceeds length 3")]
    fn test_insert_at_out_of_bounds() {
        let mut ring = Ring::from(vec![1, 2, 3]);
        ring.insert_at(4, [0]);
    }

    #[test]
    fn test_remove_operations() {
        let mut ring: Ring<_> = (0..10).collect();

        assert_eq!(ring.remove_at(2, 3, false), vec![2, 3, 4]);
        assert_eq!(contents(&ring), vec![0, 1, 5, 6, 7, 8, 9]);

        assert_eq!(ring.remove(1, false), Some(1));
        assert_eq!(ring.remove(10, false), None);

        ring.remove_first(2, false);
        assert_eq!(contents(&ring), vec![6, 7, 8, 9]);

        ring.remove_last(1);
        assert_eq!(contents(&ring), vec![6, 7, 8]);

        assert_eq!(ring.pop_first(), Some(6));
        assert_eq!(ring.pop_last(), Some(8));
        assert_eq!(contents(&ring), vec![7]);

        ring.remove_all(false);
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 0);
        assert_eq!(ring.pop_first(), None);
        assert_eq!(ring.pop_last(), None);
    }

    #[test]
    #[should_panic(expected = "cannot remove 3 elements at 2 from length 4")]
    fn test_remove_at_out_of_bounds() {
        let mut ring: Ring<_> = (0..4).collect();
        ring.remove_at(2, 3, true);
    }

    #[test]
    #[should_panic(expected = "cannot remove 5 elements from length 4")]
    fn test_remove_last_too_many() {
        let mut ring: Ring<_> = (0..4).collect();
        ring.remove_last(5);
    }

    #[test]
    fn test_replace() {
        let mut ring: Ring<_> = (0..6).collect();

        // Grow
        let removed = ring.replace(1..3, [10, 11, 12, 13]);
        assert_eq!(removed, vec![1, 2]);
        assert_eq!(contents(&ring), vec![0, 10, 11, 12, 13, 3, 4, 5]);

        // Shrink
        let removed = ring.replace(1..5, [20]);
        assert_eq!(removed, vec![10, 11, 12, 13]);
        assert_eq!(contents(&ring), vec![0, 20, 3, 4, 5]);

        // Empty range is an insertion
        let removed = ring.replace(5..5, [30]);
        assert!(removed.is_empty());
        assert_eq!(contents(&ring), vec![0, 20, 3, 4, 5, 30]);
    }

    #[test]
    fn test_remove_all_keeping_capacity() {
        let mut ring: Ring<_> = (0..32).collect();
        let capacity = ring.capacity();
        ring.remove_all(true);
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), capacity);
    }

    #[test]
    fn test_shrinks_when_sparse() {
        let mut ring = Ring::with_capacity(1024);
        ring.append(0..1000);
        let capacity = ring.capacity();

        // Keeping capacity never shrinks
        ring.remove_first(990, true);
        assert_eq!(ring.capacity(), capacity);

        // Dropping below a quarter of capacity shrinks
        ring.remove_first(1, false);
        assert!(ring.capacity() < capacity);
        assert_eq!(contents(&ring), (991..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_reserve_capacity() {
        let mut ring = Ring::<u32>::new();
        ring.reserve_capacity(100);
        assert!(ring.capacity() >= 100);

        let capacity = ring.capacity();
        ring.reserve_capacity(0);
        assert_eq!(ring.capacity(), capacity);

        ring.append(0..10);
        let residual = ring.residual_capacity();
        ring.reserve_capacity(50);
        assert!(ring.residual_capacity() >= residual + 50);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut ring = Ring::from(vec![1, 2, 3]);
        let copy = ring.copy(8);
        assert!(copy.capacity() >= ring.capacity() + 8);
        assert_eq!(contents(&copy), vec![1, 2, 3]);

        ring[0] = 100;
        assert_eq!(copy[0], 1);
    }

    #[test]
    fn test_contiguous_access() {
        let mut ring = Ring::with_capacity(4);
        ring.append([1, 2, 3]);
        ring.pop_first();
        ring.append([4, 5]);

        let (front, back) = ring.as_slices();
        assert_eq!([front, back].concat(), vec![2, 3, 4, 5]);

        let slice = ring.make_contiguous();
        slice[0] = 20;
        assert_eq!(contents(&ring), vec![20, 3, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "index 3 out of bounds for length 3")]
    fn test_index_out_of_bounds() {
        let ring = Ring::from(vec![1, 2, 3]);
        let _ = ring[3];
    }
}
