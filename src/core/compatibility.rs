//! Pairwise lifestyle compatibility tables.
//!
//! Each table is square and symmetric, indexed by the enum's `index()`.
//! `PreferNotToSay` has no index and yields no score, so the pair is left
//! out of the lifestyle average instead of counting as a mismatch.

use crate::models::{ChildrenStatus, DrinkingHabit, EducationLevel, Religion, SmokingHabit};

/// never, occasionally, social_drinker, regularly, heavily
pub const DRINKING: [[f64; 5]; 5] = [
    [1.0, 0.7, 0.4, 0.2, 0.0],
    [0.7, 1.0, 0.8, 0.5, 0.2],
    [0.4, 0.8, 1.0, 0.8, 0.4],
    [0.2, 0.5, 0.8, 1.0, 0.7],
    [0.0, 0.2, 0.4, 0.7, 1.0],
];

/// never, occasionally, regularly, quit
pub const SMOKING: [[f64; 4]; 4] = [
    [1.0, 0.3, 0.1, 0.8],
    [0.3, 1.0, 0.7, 0.4],
    [0.1, 0.7, 1.0, 0.2],
    [0.8, 0.4, 0.2, 1.0],
];

/// no_children, has_children, wants_children, doesnt_want_children, not_sure
pub const CHILDREN: [[f64; 5]; 5] = [
    [1.0, 0.6, 0.7, 0.7, 0.7],
    [0.6, 1.0, 0.7, 0.3, 0.6],
    [0.7, 0.7, 1.0, 0.0, 0.5],
    [0.7, 0.3, 0.0, 1.0, 0.5],
    [0.7, 0.6, 0.5, 0.5, 1.0],
];

/// christianity, islam, hinduism, buddhism, judaism, sikhism,
/// atheist, agnostic, spiritual, other
pub const RELIGION: [[f64; 10]; 10] = [
    [1.0, 0.3, 0.3, 0.3, 0.3, 0.3, 0.2, 0.3, 0.5, 0.4],
    [0.3, 1.0, 0.3, 0.3, 0.3, 0.3, 0.2, 0.3, 0.5, 0.4],
    [0.3, 0.3, 1.0, 0.3, 0.3, 0.3, 0.2, 0.3, 0.5, 0.4],
    [0.3, 0.3, 0.3, 1.0, 0.3, 0.3, 0.2, 0.3, 0.5, 0.4],
    [0.3, 0.3, 0.3, 0.3, 1.0, 0.3, 0.2, 0.3, 0.5, 0.4],
    [0.3, 0.3, 0.3, 0.3, 0.3, 1.0, 0.2, 0.3, 0.5, 0.4],
    [0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 1.0, 0.8, 0.4, 0.4],
    [0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.8, 1.0, 0.6, 0.4],
    [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.4, 0.6, 1.0, 0.4],
    [0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 1.0],
];

/// high_school, some_college, bachelors, masters, doctorate, professional
pub const EDUCATION: [[f64; 6]; 6] = [
    [1.0, 0.8, 0.5, 0.3, 0.2, 0.3],
    [0.8, 1.0, 0.8, 0.5, 0.3, 0.5],
    [0.5, 0.8, 1.0, 0.8, 0.6, 0.8],
    [0.3, 0.5, 0.8, 1.0, 0.9, 0.9],
    [0.2, 0.3, 0.6, 0.9, 1.0, 0.9],
    [0.3, 0.5, 0.8, 0.9, 0.9, 1.0],
];

#[inline]
fn lookup<const N: usize>(table: &[[f64; N]; N], a: Option<usize>, b: Option<usize>) -> Option<f64> {
    Some(table[a?][b?])
}

/// Symmetric compatibility between two values of one lifestyle attribute
pub trait Compatibility: Copy {
    /// Score in [0, 1]; `None` when either side is undisclosed
    fn compatibility(self, other: Self) -> Option<f64>;
}

impl Compatibility for DrinkingHabit {
    fn compatibility(self, other: Self) -> Option<f64> {
        lookup(&DRINKING, self.index(), other.index())
    }
}

impl Compatibility for SmokingHabit {
    fn compatibility(self, other: Self) -> Option<f64> {
        lookup(&SMOKING, self.index(), other.index())
    }
}

impl Compatibility for ChildrenStatus {
    fn compatibility(self, other: Self) -> Option<f64> {
        lookup(&CHILDREN, self.index(), other.index())
    }
}

impl Compatibility for Religion {
    fn compatibility(self, other: Self) -> Option<f64> {
        lookup(&RELIGION, self.index(), other.index())
    }
}

impl Compatibility for EducationLevel {
    fn compatibility(self, other: Self) -> Option<f64> {
        lookup(&EDUCATION, self.index(), other.index())
    }
}

/// Compatibility of two optional attributes; unknown on either side yields `None`
#[inline]
pub fn pair<T: Compatibility>(a: Option<T>, b: Option<T>) -> Option<f64> {
    a?.compatibility(b?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_symmetric_unit<const N: usize>(name: &str, table: &[[f64; N]; N]) {
        for i in 0..N {
            assert_eq!(table[i][i], 1.0, "{} diagonal at {}", name, i);
            for j in 0..N {
                assert_eq!(table[i][j], table[j][i], "{} asymmetric at ({}, {})", name, i, j);
                assert!((0.0..=1.0).contains(&table[i][j]));
            }
        }
    }

    #[test]
    fn test_tables_are_symmetric() {
        assert_symmetric_unit("drinking", &DRINKING);
        assert_symmetric_unit("smoking", &SMOKING);
        assert_symmetric_unit("children", &CHILDREN);
        assert_symmetric_unit("religion", &RELIGION);
        assert_symmetric_unit("education", &EDUCATION);
    }

    #[test]
    fn test_smoker_mismatch_scores_lower() {
        let same = SmokingHabit::Never.compatibility(SmokingHabit::Never).unwrap();
        let mixed = SmokingHabit::Never.compatibility(SmokingHabit::Regularly).unwrap();
        assert!(mixed < same);
    }

    #[test]
    fn test_undisclosed_yields_none() {
        assert_eq!(
            Religion::Islam.compatibility(Religion::PreferNotToSay),
            None
        );
        assert_eq!(pair::<DrinkingHabit>(None, Some(DrinkingHabit::Never)), None);
    }

    #[test]
    fn test_children_opposite_wishes() {
        let score = ChildrenStatus::WantsChildren
            .compatibility(ChildrenStatus::DoesntWantChildren)
            .unwrap();
        assert_eq!(score, 0.0);
    }
}
