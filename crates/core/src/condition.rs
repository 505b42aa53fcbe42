//! Half-open range conditions
//!
//! A `Condition` carries exactly one bound. That shape is load-bearing: the
//! same value drives the scan (which entries to yield, in which direction)
//! and commit-time conflict detection (which later writes invalidate the
//! scan). `gt`/`gte` scan ascending; `lt`/`lte` scan descending, so the
//! highest matching key comes first.

use crate::error::{Error, Result};

/// Iteration order of a range scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Lowest key first (`gt`/`gte`)
    Ascending,
    /// Highest key first (`lt`/`lte`)
    Descending,
}

/// A one-sided range bound over keys of type `K`
///
/// Exactly one of the four comparisons. A record with zero or multiple
/// bounds set is rejected by [`Condition::from_bounds`] with
/// [`Error::InvalidCondition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition<K> {
    /// Keys strictly greater than the bound, ascending
    Gt(K),
    /// Keys greater than or equal to the bound, ascending
    Gte(K),
    /// Keys strictly less than the bound, descending
    Lt(K),
    /// Keys less than or equal to the bound, descending
    Lte(K),
}

impl<K> Condition<K> {
    /// Build a condition from an optional-bounds record, enforcing the
    /// exactly-one-bound shape.
    pub fn from_bounds(
        gt: Option<K>,
        gte: Option<K>,
        lt: Option<K>,
        lte: Option<K>,
    ) -> Result<Self> {
        let set = gt.is_some() as u8 + gte.is_some() as u8 + lt.is_some() as u8 + lte.is_some() as u8;
        match (set, gt, gte, lt, lte) {
            (1, Some(k), _, _, _) => Ok(Condition::Gt(k)),
            (1, _, Some(k), _, _) => Ok(Condition::Gte(k)),
            (1, _, _, Some(k), _) => Ok(Condition::Lt(k)),
            (1, _, _, _, Some(k)) => Ok(Condition::Lte(k)),
            (0, ..) => Err(Error::InvalidCondition("no bound set".into())),
            _ => Err(Error::InvalidCondition(format!("{set} bounds set, expected exactly one"))),
        }
    }

    /// The scan direction implied by the bound
    pub fn direction(&self) -> Direction {
        match self {
            Condition::Gt(_) | Condition::Gte(_) => Direction::Ascending,
            Condition::Lt(_) | Condition::Lte(_) => Direction::Descending,
        }
    }

    /// The bound key
    pub fn bound(&self) -> &K {
        match self {
            Condition::Gt(k) | Condition::Gte(k) | Condition::Lt(k) | Condition::Lte(k) => k,
        }
    }

    /// Rebuild the condition around a transformed bound, keeping the
    /// comparison kind.
    pub fn map<J>(self, f: impl FnOnce(K) -> J) -> Condition<J> {
        match self {
            Condition::Gt(k) => Condition::Gt(f(k)),
            Condition::Gte(k) => Condition::Gte(f(k)),
            Condition::Lt(k) => Condition::Lt(f(k)),
            Condition::Lte(k) => Condition::Lte(f(k)),
        }
    }
}

impl<K: Ord> Condition<K> {
    /// Whether `key` satisfies the bound under exact boundary semantics:
    /// `gt`/`lt` exclude the bound itself, `gte`/`lte` include it.
    pub fn admits(&self, key: &K) -> bool {
        match self {
            Condition::Gt(b) => key > b,
            Condition::Gte(b) => key >= b,
            Condition::Lt(b) => key < b,
            Condition::Lte(b) => key <= b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_bound_is_required() {
        assert!(matches!(
            Condition::<u32>::from_bounds(None, None, None, None),
            Err(Error::InvalidCondition(_))
        ));
        assert!(matches!(
            Condition::from_bounds(Some(1), Some(2), None, None),
            Err(Error::InvalidCondition(_))
        ));
        assert!(matches!(
            Condition::from_bounds(Some(1), Some(2), Some(3), Some(4)),
            Err(Error::InvalidCondition(_))
        ));
        assert_eq!(
            Condition::from_bounds(None, None, Some(3), None).unwrap(),
            Condition::Lt(3)
        );
    }

    #[test]
    fn direction_follows_bound_kind() {
        assert_eq!(Condition::Gt(1).direction(), Direction::Ascending);
        assert_eq!(Condition::Gte(1).direction(), Direction::Ascending);
        assert_eq!(Condition::Lt(1).direction(), Direction::Descending);
        assert_eq!(Condition::Lte(1).direction(), Direction::Descending);
    }

    #[test]
    fn admits_is_exact_at_the_boundary() {
        // {gt: 2} admits 3 but not 2
        assert!(Condition::Gt(2).admits(&3));
        assert!(!Condition::Gt(2).admits(&2));
        // {lte: 2} admits 2 but not 3
        assert!(Condition::Lte(2).admits(&2));
        assert!(!Condition::Lte(2).admits(&3));
        assert!(Condition::Gte(2).admits(&2));
        assert!(!Condition::Gte(2).admits(&1));
        assert!(Condition::Lt(2).admits(&1));
        assert!(!Condition::Lt(2).admits(&2));
    }

    #[test]
    fn map_preserves_comparison_kind() {
        let c = Condition::Lte(10u32).map(|k| k.to_string());
        assert_eq!(c, Condition::Lte("10".to_string()));
    }
}
