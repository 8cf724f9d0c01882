use std::cmp::Ordering;
use std::ops::{BitAnd, BitOr};

use crate::ClassIdx;

/// A sorted set of [`ClassIdx`] values
///
/// `ClassSet` is the workhorse of the scoring layer: every ancestor closure,
/// every annotation set and every intersection/union in the similarity
/// formulas is a `ClassSet`. The indices are kept sorted and unique, so
/// lookups use binary search and set operations are linear merge walks.
/// Sorted dense indices also make all iteration orders deterministic, which
/// the tie-break rules of the scorers rely on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassSet {
    ids: Vec<ClassIdx>,
}

impl ClassSet {
    /// Constructs a new, empty `ClassSet`
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty `ClassSet` with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the set contains no classes
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of classes in the set
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a class to the set
    ///
    /// Returns whether the class was newly inserted:
    ///
    /// - `true` if the set did not previously contain the class
    /// - `false` if it was already present
    pub fn insert(&mut self, idx: ClassIdx) -> bool {
        match self.ids.binary_search(&idx) {
            Ok(_) => false,
            Err(pos) => {
                self.ids.insert(pos, idx);
                true
            }
        }
    }

    /// Returns `true` if the set contains the class
    pub fn contains(&self, idx: ClassIdx) -> bool {
        self.ids.binary_search(&idx).is_ok()
    }

    /// Returns an iterator over the classes in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = ClassIdx> + '_ {
        self.ids.iter().copied()
    }

    /// Returns the class at the given position, if present
    pub fn get(&self, index: usize) -> Option<ClassIdx> {
        self.ids.get(index).copied()
    }

    /// Returns the size of the intersection with `other`
    ///
    /// Equivalent to `(self & other).len()` without building the
    /// intermediate set.
    pub fn intersection_len(&self, other: &ClassSet) -> usize {
        let mut lhs = self.ids.iter();
        let mut rhs = other.ids.iter();
        let mut count = 0usize;
        let (mut a, mut b) = (lhs.next(), rhs.next());
        while let (Some(x), Some(y)) = (a, b) {
            match x.cmp(y) {
                Ordering::Less => a = lhs.next(),
                Ordering::Greater => b = rhs.next(),
                Ordering::Equal => {
                    count += 1;
                    a = lhs.next();
                    b = rhs.next();
                }
            }
        }
        count
    }

    /// Returns the size of the union with `other`
    pub fn union_len(&self, other: &ClassSet) -> usize {
        self.len() + other.len() - self.intersection_len(other)
    }
}

impl FromIterator<ClassIdx> for ClassSet {
    fn from_iter<I: IntoIterator<Item = ClassIdx>>(iter: I) -> Self {
        let mut set = ClassSet::new();
        for idx in iter {
            set.insert(idx);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ClassSet {
    type Item = ClassIdx;
    type IntoIter = ClassSetIter<'a>;

    fn into_iter(self) -> ClassSetIter<'a> {
        ClassSetIter {
            inner: self.ids.iter(),
        }
    }
}

/// An iterator over the [`ClassIdx`] values of a [`ClassSet`]
pub struct ClassSetIter<'a> {
    inner: std::slice::Iter<'a, ClassIdx>,
}

impl Iterator for ClassSetIter<'_> {
    type Item = ClassIdx;
    fn next(&mut self) -> Option<ClassIdx> {
        self.inner.next().copied()
    }
}

impl BitAnd for &ClassSet {
    type Output = ClassSet;

    fn bitand(self, rhs: &ClassSet) -> ClassSet {
        let mut ids = Vec::with_capacity(self.len().min(rhs.len()));
        let mut lhs_iter = self.ids.iter();
        let mut rhs_iter = rhs.ids.iter();
        let (mut a, mut b) = (lhs_iter.next(), rhs_iter.next());
        while let (Some(x), Some(y)) = (a, b) {
            match x.cmp(y) {
                Ordering::Less => a = lhs_iter.next(),
                Ordering::Greater => b = rhs_iter.next(),
                Ordering::Equal => {
                    ids.push(*x);
                    a = lhs_iter.next();
                    b = rhs_iter.next();
                }
            }
        }
        ClassSet { ids }
    }
}

impl BitOr for &ClassSet {
    type Output = ClassSet;

    fn bitor(self, rhs: &ClassSet) -> ClassSet {
        let mut ids = Vec::with_capacity(self.len() + rhs.len());
        let mut lhs_iter = self.ids.iter().peekable();
        let mut rhs_iter = rhs.ids.iter().peekable();
        loop {
            match (lhs_iter.peek(), rhs_iter.peek()) {
                (Some(x), Some(y)) => match x.cmp(y) {
                    Ordering::Less => ids.push(*lhs_iter.next().expect("peeked")),
                    Ordering::Greater => ids.push(*rhs_iter.next().expect("peeked")),
                    Ordering::Equal => {
                        ids.push(*lhs_iter.next().expect("peeked"));
                        rhs_iter.next();
                    }
                },
                (Some(_), None) => ids.push(*lhs_iter.next().expect("peeked")),
                (None, Some(_)) => ids.push(*rhs_iter.next().expect("peeked")),
                (None, None) => break,
            }
        }
        ClassSet { ids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u32]) -> ClassSet {
        ids.iter().map(|n| ClassIdx::from(*n)).collect()
    }

    #[test]
    fn insert_keeps_sorted_unique() {
        let mut group = ClassSet::new();
        assert!(group.insert(3u32.into()));
        assert!(group.insert(1u32.into()));
        assert!(group.insert(2u32.into()));
        assert!(!group.insert(2u32.into()));

        let ids: Vec<ClassIdx> = group.iter().collect();
        assert_eq!(ids, vec![1u32.into(), 2u32.into(), 3u32.into()]);
        assert_eq!(group.len(), 3);
        assert!(group.contains(1u32.into()));
        assert!(!group.contains(4u32.into()));
    }

    #[test]
    fn bitor_merges() {
        let result = &set(&[1, 2, 3]) | &set(&[2, 4]);
        assert_eq!(result, set(&[1, 2, 3, 4]));

        let result = &set(&[1, 2, 3]) | &set(&[1, 2, 4, 5]);
        assert_eq!(result, set(&[1, 2, 3, 4, 5]));

        let result = &set(&[]) | &set(&[7]);
        assert_eq!(result, set(&[7]));
    }

    #[test]
    fn bitand_intersects() {
        let result = &set(&[1, 2, 3]) & &set(&[2, 4, 5, 1]);
        assert_eq!(result, set(&[1, 2]));

        let result = &set(&[1, 2]) & &set(&[3, 4]);
        assert!(result.is_empty());
    }

    #[test]
    fn intersection_and_union_len() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2, 3, 4, 5]);
        assert_eq!(a.intersection_len(&b), 2);
        assert_eq!(a.union_len(&b), 5);

        // overlap(A,B) <= min(|A|,|B|), union(A,B) >= max(|A|,|B|)
        assert!(a.intersection_len(&b) <= a.len().min(b.len()));
        assert!(a.union_len(&b) >= a.len().max(b.len()));

        let empty = ClassSet::new();
        assert_eq!(a.intersection_len(&empty), 0);
        assert_eq!(a.union_len(&empty), 3);
    }
}
