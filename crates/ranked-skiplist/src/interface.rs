use std::cmp::Ordering;


/// Interface for comparing values in a [`RankedSkiplist`].
///
/// The comparator must be a total order, and it must stay consistent for the lifetime of the
/// skiplist; the placement of every value, the duplicate check done by insertions, and every
/// rank reported by the skiplist are all derived from it.
///
/// Lookups may be performed with a borrowed form `Q` of the stored type `T` (that is, when
/// `T: Borrow<Q>`). A comparator used that way must implement both `Comparator<T>` and
/// `Comparator<Q>`, and the two orders must agree.
///
/// Any `Fn(&T, &T) -> Ordering` closure or function is a comparator.
///
/// [`RankedSkiplist`]: crate::RankedSkiplist
pub trait Comparator<T: ?Sized> {
    /// Compare two values of a [`RankedSkiplist`].
    ///
    /// [`RankedSkiplist`]: crate::RankedSkiplist
    #[must_use]
    fn cmp(&self, lhs: &T, rhs: &T) -> Ordering;
}

impl<T: ?Sized, F: Fn(&T, &T) -> Ordering> Comparator<T> for F {
    #[inline]
    fn cmp(&self, lhs: &T, rhs: &T) -> Ordering {
        self(lhs, rhs)
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn closures_are_comparators() {
        fn by_len(lhs: &str, rhs: &str) -> Ordering {
            Ord::cmp(&lhs.len(), &rhs.len())
        }

        let reversed = |lhs: &u32, rhs: &u32| Ord::cmp(rhs, lhs);

        assert_eq!(Comparator::cmp(&reversed, &1, &2), Ordering::Greater);
        assert_eq!(Comparator::cmp(&reversed, &2, &2), Ordering::Equal);

        assert_eq!(Comparator::<str>::cmp(&by_len, "abc", "z"), Ordering::Greater);
    }
}
