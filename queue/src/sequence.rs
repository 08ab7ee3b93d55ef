//! Random-access sequence capabilities shared by [crate::RandomQueue] and [crate::QueueView].
//!
//! [Sequence] requires only `len` and `get`; traversal helpers (`map`, `filter`, `fold`, ...) are
//! implemented once on top of them. [SequenceMut] requires `get_mut`, `splice`, and `reserve`;
//! every other mutation is derived from `splice`, and implementors override the ones they can do
//! faster.

use crate::{out_of_bounds, Error};
use std::{
    iter::{self, FusedIterator},
    ops::{Bound, Range, RangeBounds},
};

/// An ordered collection with O(1) random access.
pub trait Sequence {
    /// The type of element held by the sequence.
    type Item;

    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns the element at `index`, if any.
    fn get(&self, index: usize) -> Option<&Self::Item>;

    /// Returns `true` if the sequence holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the first element, if any.
    fn first(&self) -> Option<&Self::Item> {
        self.get(0)
    }

    /// Returns the last element, if any.
    fn last(&self) -> Option<&Self::Item> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns an iterator over the elements in index order.
    fn elements(&self) -> Elements<'_, Self>
    where
        Self: Sized,
    {
        Elements {
            sequence: self,
            front: 0,
            back: self.len(),
        }
    }

    /// Calls `f` on every element in index order.
    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Self::Item),
    {
        for index in 0..self.len() {
            if let Some(element) = self.get(index) {
                f(element);
            }
        }
    }

    /// Returns `true` if `predicate` holds for every element (vacuously `true` when empty).
    fn all<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Self::Item) -> bool,
    {
        (0..self.len()).all(|index| self.get(index).is_some_and(&mut predicate))
    }

    /// Returns the result of folding every element into `init` with `f`.
    fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &Self::Item) -> A,
    {
        let mut accumulator = init;
        for index in 0..self.len() {
            if let Some(element) = self.get(index) {
                accumulator = f(accumulator, element);
            }
        }
        accumulator
    }

    /// Like [Sequence::fold], but `f` updates the accumulator in place.
    fn reduce_into<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(&mut A, &Self::Item),
    {
        let mut accumulator = init;
        self.for_each(|element| f(&mut accumulator, element));
        accumulator
    }

    /// Returns the result of applying `f` to every element, in index order.
    fn map<U, F>(&self, mut f: F) -> Vec<U>
    where
        F: FnMut(&Self::Item) -> U,
    {
        let mut result = Vec::with_capacity(self.len());
        self.for_each(|element| result.push(f(element)));
        result
    }

    /// Returns the elements for which `predicate` holds, in index order.
    fn filter<F>(&self, mut predicate: F) -> Vec<Self::Item>
    where
        Self::Item: Clone,
        F: FnMut(&Self::Item) -> bool,
    {
        self.filter_map(|element| predicate(element).then(|| element.clone()))
    }

    /// Returns the non-`None` results of applying `f` to every element, in index order.
    fn filter_map<U, F>(&self, mut f: F) -> Vec<U>
    where
        F: FnMut(&Self::Item) -> Option<U>,
    {
        self.reduce_into(Vec::new(), |result, element| result.extend(f(element)))
    }

    /// Returns the concatenation of the results of applying `f` to every element.
    fn flat_map<I, F>(&self, mut f: F) -> Vec<I::Item>
    where
        I: IntoIterator,
        F: FnMut(&Self::Item) -> I,
    {
        self.reduce_into(Vec::new(), |result, element| result.extend(f(element)))
    }
}

/// A [Sequence] whose contents can be changed in place and by range replacement.
///
/// All indices and ranges are relative to the sequence itself. Out-of-range indices and malformed
/// ranges are contract violations and panic before anything is mutated.
pub trait SequenceMut: Sequence {
    /// Returns a mutable reference to the element at `index`, if any.
    fn get_mut(&mut self, index: usize) -> Option<&mut Self::Item>;

    /// Replaces the elements in `range` with `replace_with`, returning the replaced elements.
    fn splice<R, I>(&mut self, range: R, replace_with: I) -> Vec<Self::Item>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = Self::Item>;

    /// Ensures room for at least `additional` more elements without reallocating.
    fn reserve(&mut self, additional: usize);

    /// Replaces the element at `index` with `element`.
    #[track_caller]
    fn set(&mut self, index: usize, element: Self::Item) {
        let len = self.len();
        match self.get_mut(index) {
            Some(slot) => *slot = element,
            None => out_of_bounds(index, len),
        }
    }

    /// Replaces the elements in `range` with `elements`.
    #[track_caller]
    fn replace_range<R, I>(&mut self, range: R, elements: I)
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = Self::Item>,
    {
        self.splice(range, elements);
    }

    /// Appends an element at the end.
    fn push(&mut self, element: Self::Item) {
        let len = self.len();
        self.splice(len..len, iter::once(element));
    }

    /// Appends every element of `elements` at the end, in order.
    fn push_all<I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = Self::Item>,
    {
        let len = self.len();
        self.splice(len..len, elements);
    }

    /// Inserts `element` at `index`, shifting later elements back.
    #[track_caller]
    fn insert(&mut self, index: usize, element: Self::Item) {
        let len = self.len();
        if index > len {
            out_of_bounds(index, len);
        }
        self.splice(index..index, iter::once(element));
    }

    /// Inserts every element of `elements` starting at `index`, in order.
    #[track_caller]
    fn insert_all<I>(&mut self, index: usize, elements: I)
    where
        I: IntoIterator<Item = Self::Item>,
    {
        let len = self.len();
        if index > len {
            out_of_bounds(index, len);
        }
        self.splice(index..index, elements);
    }

    /// Removes and returns the element at `index`.
    #[track_caller]
    fn remove(&mut self, index: usize) -> Self::Item {
        let len = self.len();
        if index >= len {
            out_of_bounds(index, len);
        }
        match self.splice(index..index + 1, iter::empty()).pop() {
            Some(element) => element,
            None => out_of_bounds(index, len),
        }
    }

    /// Removes the elements in `range`.
    #[track_caller]
    fn remove_range<R>(&mut self, range: R)
    where
        R: RangeBounds<usize>,
    {
        self.splice(range, iter::empty());
    }

    /// Removes and returns the first element.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    fn remove_first(&mut self) -> Self::Item {
        assert!(
            !self.is_empty(),
            "cannot remove first element of an empty sequence"
        );
        self.remove(0)
    }

    /// Removes the first `k` elements.
    ///
    /// # Panics
    ///
    /// Panics if `k > len`.
    #[track_caller]
    fn remove_first_n(&mut self, k: usize) {
        let len = self.len();
        assert!(k <= len, "cannot remove {k} elements from length {len}");
        self.splice(..k, iter::empty());
    }

    /// Removes and returns the last element.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is empty.
    #[track_caller]
    fn remove_last(&mut self) -> Self::Item {
        assert!(
            !self.is_empty(),
            "cannot remove last element of an empty sequence"
        );
        self.remove(self.len() - 1)
    }

    /// Removes the last `k` elements.
    ///
    /// # Panics
    ///
    /// Panics if `k > len`.
    #[track_caller]
    fn remove_last_n(&mut self, k: usize) {
        let len = self.len();
        assert!(k <= len, "cannot remove {k} elements from length {len}");
        self.splice(len - k.., iter::empty());
    }

    /// Removes and returns the first element, or `None` if empty.
    fn pop_first(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            return None;
        }
        Some(self.remove(0))
    }

    /// Removes and returns the last element, or `None` if empty.
    fn pop_last(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            return None;
        }
        Some(self.remove(self.len() - 1))
    }

    /// Removes every element.
    ///
    /// The default removes elements through [SequenceMut::splice] and ignores `keep_capacity`.
    /// Implementors that own storage override it to release their allocation unless
    /// `keep_capacity` is set.
    fn remove_all(&mut self, _keep_capacity: bool) {
        self.splice(.., iter::empty());
    }
}

/// Iterator over the elements of any [Sequence], in index order.
pub struct Elements<'a, S: Sequence> {
    sequence: &'a S,
    front: usize,
    back: usize,
}

impl<'a, S: Sequence> Iterator for Elements<'a, S> {
    type Item = &'a S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let element = self.sequence.get(self.front);
        self.front += 1;
        element
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<S: Sequence> DoubleEndedIterator for Elements<'_, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.sequence.get(self.back)
    }
}

impl<S: Sequence> ExactSizeIterator for Elements<'_, S> {}

impl<S: Sequence> FusedIterator for Elements<'_, S> {}

/// Resolves `range` against a sequence of length `len`.
pub(crate) fn try_resolve<R: RangeBounds<usize>>(
    range: R,
    len: usize,
) -> Result<Range<usize>, Error> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.checked_add(1).ok_or(Error::RangeOverflow)?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.checked_add(1).ok_or(Error::RangeOverflow)?,
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    if start > end {
        return Err(Error::InvalidRange(start, end));
    }
    if end > len {
        return Err(Error::RangeOutOfBounds(end, len));
    }
    Ok(start..end)
}

/// Resolves `range` against a sequence of length `len`, panicking if it is malformed.
#[track_caller]
pub(crate) fn resolve<R: RangeBounds<usize>>(range: R, len: usize) -> Range<usize> {
    match try_resolve(range, len) {
        Ok(range) => range,
        Err(err) => panic!("{err}"),
    }
}
