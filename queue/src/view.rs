//! A contiguous sub-range of a [RandomQueue].
//!
//! A [QueueView] owns a clone of the queue it was sliced from plus the bounds it exposes. Since
//! [RandomQueue] is copy-on-write, slicing is cheap, but the first mutation of either side gives
//! it a private ring: writes through a view are never observed by the originating queue (and vice
//! versa).
//!
//! Indices are relative to the view: index `0` is the first viewed element.

use crate::{
    out_of_bounds,
    random_queue::Iter,
    sequence::{resolve, try_resolve},
    Error, RandomQueue, Sequence, SequenceMut,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error as CodecError, RangeCfg, Read, Write};
use rand::Rng;
use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::{Index, IndexMut, Range, RangeBounds},
};

/// A view over `bounds` of a privately held [RandomQueue].
pub struct QueueView<T> {
    base: RandomQueue<T>,
    bounds: Range<usize>,
}

impl<T> QueueView<T> {
    /// Creates an empty view over an empty queue.
    pub const fn new() -> Self {
        Self {
            base: RandomQueue::new(),
            bounds: 0..0,
        }
    }

    /// Creates a view over `range` of `base`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is malformed or exceeds `base.len()`.
    #[track_caller]
    pub fn with_bounds<R: RangeBounds<usize>>(base: RandomQueue<T>, range: R) -> Self {
        let bounds = resolve(range, base.len());
        Self { base, bounds }
    }

    /// Creates a view over `range` of `base`, or returns an error if `range` is not within
    /// `0..base.len()`.
    pub fn try_with_bounds<R: RangeBounds<usize>>(
        base: RandomQueue<T>,
        range: R,
    ) -> Result<Self, Error> {
        let bounds = try_resolve(range, base.len())?;
        Ok(Self { base, bounds })
    }

    /// Creates a full-range view over a queue holding `elements` in random order.
    pub fn from_iter_with<I, R>(elements: I, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = T>,
        R: Rng + ?Sized,
    {
        RandomQueue::from_iter_with(elements, rng).into()
    }

    pub(crate) fn from_parts(base: RandomQueue<T>, bounds: Range<usize>) -> Self {
        debug_assert!(bounds.start <= bounds.end && bounds.end <= base.len());
        Self { base, bounds }
    }

    /// Returns the queue this view reads from.
    pub fn base(&self) -> &RandomQueue<T> {
        &self.base
    }

    /// Returns the viewed range of [QueueView::base].
    pub fn bounds(&self) -> Range<usize> {
        self.bounds.clone()
    }

    /// Returns the number of viewed elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Returns `true` if the view holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Returns the element at relative `index`, if any.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        self.base.get(self.bounds.start + index)
    }

    /// Returns an iterator over the viewed elements in index order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.base.range(self.bounds.clone())
    }

    /// Returns a view over `range` (relative to this view), sharing this view's storage until
    /// either is mutated.
    ///
    /// # Panics
    ///
    /// Panics if `range` is malformed or exceeds `len`.
    #[track_caller]
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Self {
        let range = resolve(range, self.len());
        Self::from_parts(self.base.clone(), self.absolute(range))
    }

    /// Returns a view over `range` (relative to this view), or an error if `range` is not within
    /// `0..len`.
    pub fn try_slice<R: RangeBounds<usize>>(&self, range: R) -> Result<Self, Error> {
        let range = try_resolve(range, self.len())?;
        Ok(Self::from_parts(self.base.clone(), self.absolute(range)))
    }

    /// Returns `true` if the view covers every element of its base.
    fn is_full_range(&self) -> bool {
        self.bounds.start == 0 && self.bounds.end == self.base.len()
    }

    /// Translates a range relative to the view into a range of the base.
    fn absolute(&self, range: Range<usize>) -> Range<usize> {
        self.bounds.start + range.start..self.bounds.start + range.end
    }
}

impl<T: Clone> QueueView<T> {
    /// Creates a full-range view over `count` copies of `value`.
    pub fn repeating(value: T, count: usize) -> Self {
        RandomQueue::repeating(value, count).into()
    }

    /// Returns the viewed elements as one mutable slice, copying shared storage first.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let bounds = self.bounds.clone();
        &mut self.base.as_mut_slice()[bounds]
    }
}

impl<T> Sequence for QueueView<T> {
    type Item = T;

    fn len(&self) -> usize {
        QueueView::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        QueueView::get(self, index)
    }
}

impl<T: Clone> SequenceMut for QueueView<T> {
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        self.base.get_mut(self.bounds.start + index)
    }

    #[track_caller]
    fn splice<R, I>(&mut self, range: R, replace_with: I) -> Vec<T>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = T>,
    {
        let range = self.absolute(resolve(range, self.len()));
        let before = self.base.len();
        let removed = self.base.splice(range, replace_with);

        // Elements after the view shift with it
        self.bounds.end = self.bounds.end + self.base.len() - before;
        removed
    }

    fn reserve(&mut self, additional: usize) {
        self.base.reserve(additional);
    }

    fn remove_all(&mut self, keep_capacity: bool) {
        if self.is_full_range() {
            self.base.remove_all(keep_capacity);
            self.bounds = 0..0;
            return;
        }
        self.remove_range(..);
    }
}

impl<T> Default for QueueView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for QueueView<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            bounds: self.bounds.clone(),
        }
    }
}

impl<T> From<RandomQueue<T>> for QueueView<T> {
    /// Creates a view over every element of `base`.
    fn from(base: RandomQueue<T>) -> Self {
        let bounds = 0..base.len();
        Self { base, bounds }
    }
}

impl<T: Clone> From<QueueView<T>> for RandomQueue<T> {
    /// Materializes the viewed elements in order, reusing the base when the view covers all of it.
    fn from(view: QueueView<T>) -> Self {
        if view.is_full_range() {
            return view.base;
        }
        let mut queue = RandomQueue::new();
        queue.reserve(view.len());
        queue.push_all(view.iter().cloned());
        queue
    }
}

impl<T> FromIterator<T> for QueueView<T> {
    /// Collects the elements in random order (see [RandomQueue::from_iter_with]).
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        RandomQueue::from_iter(iter).into()
    }
}

impl<T: Clone> Extend<T> for QueueView<T> {
    /// Appends the elements at the end of the view, in order.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.push_all(iter);
    }
}

impl<T> Index<usize> for QueueView<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(element) => element,
            None => out_of_bounds(index, self.len()),
        }
    }
}

impl<T: Clone> IndexMut<usize> for QueueView<T> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let len = self.len();
        match self.get_mut(index) {
            Some(element) => element,
            None => out_of_bounds(index, len),
        }
    }
}

impl<T: PartialEq> PartialEq for QueueView<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.bounds == other.bounds && self.base.shares_storage_with(&other.base) {
            return true;
        }
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for QueueView<T> {}

impl<T: PartialEq> PartialEq<[T]> for QueueView<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for QueueView<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        *self == other[..]
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for QueueView<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == other[..]
    }
}

impl<T: PartialEq> PartialEq<RandomQueue<T>> for QueueView<T> {
    fn eq(&self, other: &RandomQueue<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Hash> Hash for QueueView<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self.iter() {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for QueueView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a QueueView<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Write> Write for QueueView<T> {
    fn write(&self, buf: &mut impl BufMut) {
        self.len().write(buf);
        for element in self.iter() {
            element.write(buf);
        }
    }
}

impl<T: EncodeSize> EncodeSize for QueueView<T> {
    fn encode_size(&self) -> usize {
        self.len().encode_size() + self.iter().map(EncodeSize::encode_size).sum::<usize>()
    }
}

impl<T: Read> Read for QueueView<T> {
    type Cfg = (RangeCfg, T::Cfg);

    fn read_cfg(buf: &mut impl Buf, cfg: &Self::Cfg) -> Result<Self, CodecError> {
        RandomQueue::read_cfg(buf, cfg).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Queue;
    use commonware_codec::{Decode, Encode};
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::hash_map::DefaultHasher;

    fn ordered(elements: impl IntoIterator<Item = u32>) -> RandomQueue<u32> {
        let mut queue = RandomQueue::new();
        queue.push_all(elements);
        queue
    }

    type Mutation = Box<dyn Fn(&mut QueueView<u32>)>;

    fn mutation(f: impl Fn(&mut QueueView<u32>) + 'static) -> Mutation {
        Box::new(f)
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_slice_is_independent_of_base() {
        let base = ordered([1, 2, 3, 4, 5]);
        let mut view = base.slice(1..4);
        assert_eq!(view, [2, 3, 4]);
        assert_eq!(view.len(), 3);
        assert_eq!(view.bounds(), 1..4);

        view[0] = 20;
        assert_eq!(base[1], 2);
        assert_eq!(view, [20, 3, 4]);
        assert_eq!(view.base(), &ordered([1, 20, 3, 4, 5]));
    }

    #[test]
    fn test_base_mutation_does_not_affect_view() {
        let mut base = ordered([1, 2, 3, 4, 5]);
        let view = base.slice(..2);
        base.remove_all(false);
        base.enqueue(9);
        assert_eq!(view, [1, 2]);
    }

    #[test]
    fn test_view_mutations_never_reach_origin() {
        let mutations = vec![
            mutation(|v| v[0] = 100),
            mutation(|v| v.set(1, 100)),
            mutation(|v| v.as_mut_slice()[0] = 100),
            mutation(|v| v.push(100)),
            mutation(|v| v.push_all([100, 101])),
            mutation(|v| v.extend([100])),
            mutation(|v| v.insert(1, 100)),
            mutation(|v| v.insert_all(0, [100, 101])),
            mutation(|v| {
                v.remove(2);
            }),
            mutation(|v| v.remove_range(1..3)),
            mutation(|v| {
                v.splice(..2, [100]);
            }),
            mutation(|v| v.replace_range(1..2, [100, 101])),
            mutation(|v| {
                v.remove_first();
            }),
            mutation(|v| {
                v.remove_last();
            }),
            mutation(|v| v.remove_first_n(2)),
            mutation(|v| v.remove_last_n(2)),
            mutation(|v| {
                v.pop_first();
            }),
            mutation(|v| {
                v.pop_last();
            }),
            mutation(|v| v.remove_all(true)),
            mutation(|v| v.remove_all(false)),
        ];

        // Both a partial and a full-range view
        for bounds in [2..6, 0..10] {
            for mutation in &mutations {
                let origin = ordered(0..10);
                let mut view = origin.slice(bounds.clone());
                assert!(view.base().shares_storage_with(&origin));

                mutation(&mut view);
                assert_eq!(origin, (0..10).collect::<Vec<_>>());
                assert!(!view.base().shares_storage_with(&origin));
                assert_ne!(view, origin.slice(bounds.clone()));
            }
        }
    }

    #[test]
    fn test_constructors() {
        let view = QueueView::<u32>::new();
        assert!(view.is_empty());
        assert_eq!(view.bounds(), 0..0);
        assert_eq!(view, QueueView::default());

        let view = QueueView::repeating(3u32, 4);
        assert_eq!(view, [3, 3, 3, 3]);
        assert_eq!(view.bounds(), 0..4);

        let mut rng = StdRng::seed_from_u64(0);
        let view = QueueView::from_iter_with(0..50u32, &mut rng);
        let mut elements: Vec<u32> = view.iter().copied().collect();
        elements.sort();
        assert_eq!(elements, (0..50).collect::<Vec<_>>());

        let view: QueueView<u32> = (0..5).collect();
        assert_eq!(view.len(), 5);

        let view = QueueView::with_bounds(ordered([1, 2, 3]), 1..);
        assert_eq!(view, [2, 3]);
        assert_eq!(
            QueueView::try_with_bounds(ordered([1, 2, 3]), 2..4).unwrap_err(),
            Error::RangeOutOfBounds(4, 3)
        );
    }

    #[test]
    #[should_panic(expected = "range start 2 exceeds range end 1")]
    fn test_with_bounds_reversed() {
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 2..1;
        let _ = QueueView::with_bounds(ordered([1, 2, 3]), reversed);
    }

    #[test]
    fn test_try_slice() {
        let base = ordered([1, 2, 3]);
        assert_eq!(base.try_slice(1..=2).unwrap(), [2, 3]);
        assert_eq!(
            base.try_slice(0..4).unwrap_err(),
            Error::RangeOutOfBounds(4, 3)
        );

        let view = base.slice(1..);
        assert_eq!(view.try_slice(1..).unwrap(), [3]);
        assert_eq!(
            view.try_slice(..3).unwrap_err(),
            Error::RangeOutOfBounds(3, 2)
        );
    }

    #[test]
    fn test_sub_slice_is_relative() {
        let base = ordered(0..10);
        let view = base.slice(2..8);
        let sub = view.slice(1..3);
        assert_eq!(sub, [3, 4]);
        assert_eq!(sub.bounds(), 3..5);
        assert!(sub.base().shares_storage_with(view.base()));
        assert_eq!(sub.get(2), None);
        assert_eq!(sub[1], 4);
    }

    #[test]
    fn test_splice_moves_end_bound() {
        let mut view = ordered(0..6).slice(2..4);
        let removed = view.splice(1..2, [30, 31, 32]);
        assert_eq!(removed, vec![3]);
        assert_eq!(view, [2, 30, 31, 32]);
        assert_eq!(view.bounds(), 2..6);
        assert_eq!(view.base(), &ordered([0, 1, 2, 30, 31, 32, 4, 5]));

        view.replace_range(.., []);
        assert!(view.is_empty());
        assert_eq!(view.bounds(), 2..2);
        assert_eq!(view.base(), &ordered([0, 1, 4, 5]));
    }

    #[test]
    fn test_remove_all() {
        // Partial view: only the viewed elements go
        let mut view = ordered(0..6).slice(1..3);
        view.remove_all(true);
        assert!(view.is_empty());
        assert_eq!(view.base(), &ordered([0, 3, 4, 5]));

        // Full view: the base is cleared, keeping its capacity if asked
        let mut view = QueueView::from(ordered(0..32));
        let capacity = view.base().capacity();
        view.remove_all(true);
        assert!(view.is_empty());
        assert_eq!(view.base().capacity(), capacity);

        let mut view = QueueView::from(ordered(0..32));
        view.remove_all(false);
        assert_eq!(view.base().capacity(), 0);
    }

    #[test]
    fn test_as_mut_slice() {
        let base = ordered([1, 2, 3, 4, 5]);
        let mut view = base.slice(1..4);
        view.as_mut_slice().reverse();
        assert_eq!(view, [4, 3, 2]);
        assert_eq!(base, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_into_queue() {
        let base = ordered([1, 2, 3, 4]);
        let queue = RandomQueue::from(base.slice(1..3));
        assert_eq!(queue, [2, 3]);

        let queue = RandomQueue::from(base.slice(..));
        assert!(queue.shares_storage_with(&base));

        let queue = RandomQueue::from(base.slice(2..2));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equality_and_hash() {
        let base = ordered([1, 2, 3, 2, 3]);
        let a = base.slice(1..3);
        let b = base.slice(3..5);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a, ordered([2, 3]));
        assert_eq!(hash_of(&a), hash_of(&ordered([2, 3])));
        assert_ne!(a, base.slice(0..2));
        assert_eq!(a, vec![2, 3]);
    }

    #[test]
    fn test_iter() {
        let view = ordered(0..10).slice(3..6);
        assert_eq!(view.iter().len(), 3);
        assert_eq!(
            view.iter().rev().copied().collect::<Vec<_>>(),
            vec![5, 4, 3]
        );
        let mut sum = 0;
        for element in &view {
            sum += element;
        }
        assert_eq!(sum, 12);
        assert_eq!(format!("{view:?}"), "[3, 4, 5]");
    }

    #[test]
    #[should_panic(expected = "index 3 out of bounds for length 3")]
    fn test_index_out_of_bounds() {
        let view = ordered(0..10).slice(3..6);
        let _ = view[3];
    }

    #[test]
    fn test_codec() {
        let view = ordered(0..10).slice(3..6);
        let mut buf = view.encode();
        assert_eq!(buf, ordered([3, 4, 5]).encode());

        let cfg = ((..).into(), ());
        let decoded = QueueView::<u32>::decode_cfg(&mut buf, &cfg).unwrap();
        assert_eq!(decoded, view);
        assert_eq!(decoded.bounds(), 0..3);
    }
}
