// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::numeric::CostNumeric;
use num_traits::{Bounded, Zero};

/// A `(penalty, cost)` pair under lexicographic order: feasibility first,
/// cost as tie-break. Lower is better.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Objective<T> {
    pub penalty: T,
    pub cost: T,
}

impl<T> Objective<T>
where
    T: CostNumeric,
{
    #[inline]
    pub const fn new(penalty: T, cost: T) -> Self {
        Self { penalty, cost }
    }

    /// The initial value of a run best: both components at the numeric
    /// maximum. Any real trial result improves over it.
    #[inline]
    pub fn unbounded() -> Self {
        Self {
            penalty: T::max_value(),
            cost: T::max_value(),
        }
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.penalty == T::zero()
    }

    /// True while no trial result has ever been accepted.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.cost == T::max_value() && self.penalty == T::max_value()
    }

    /// Strict lexicographic improvement test: `self` must beat `incumbent`
    /// on penalty, or match penalty and beat it on cost. An exactly equal
    /// pair is not an improvement.
    #[inline]
    pub fn improves_over(&self, incumbent: &Self) -> bool {
        self.penalty < incumbent.penalty
            || (self.penalty == incumbent.penalty && self.cost < incumbent.cost)
    }
}

impl<T> Ord for Objective<T>
where
    T: CostNumeric,
{
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.penalty.cmp(&other.penalty) {
            std::cmp::Ordering::Equal => self.cost.cmp(&other.cost),
            ord => ord,
        }
    }
}

impl<T> PartialOrd for Objective<T>
where
    T: CostNumeric,
{
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> std::fmt::Display for Objective<T>
where
    T: CostNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Objective(penalty: {}, cost: {})",
            self.penalty, self.cost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_new_feasibility_and_display() {
        let o = Objective::new(3i64, 456);
        assert_eq!(o.penalty, 3);
        assert_eq!(o.cost, 456);
        assert!(!o.is_feasible());
        assert_eq!(o.to_string(), "Objective(penalty: 3, cost: 456)");

        let z = Objective::new(0i64, 100);
        assert!(z.is_feasible());
    }

    #[test]
    fn test_unbounded_is_worst() {
        let u = Objective::<i64>::unbounded();
        assert!(u.is_unbounded());
        assert!(!u.is_feasible());

        // Even a heavily penalized real result beats the initial value.
        let bad = Objective::new(i64::MAX - 1, i64::MAX);
        assert!(bad.improves_over(&u));
        assert!(!u.improves_over(&bad));
    }

    #[test]
    fn test_lexicographic_ordering() {
        let a = Objective::new(0i64, 100);
        let b = Objective::new(0i64, 150);
        let c = Objective::new(1i64, 1);
        let d = Objective::new(2i64, 0);

        assert!(a < b, "lower cost among equal penalty is better");
        assert!(a < c, "feasible dominates infeasible");
        assert!(c < d, "lower penalty dominates regardless of cost");

        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));
        assert_eq!(a.partial_cmp(&a), Some(Ordering::Equal));

        let mut v = vec![d, b, c, a];
        v.sort();
        assert_eq!(v, vec![a, b, c, d]);
    }

    #[test]
    fn test_improvement_is_strict() {
        let incumbent = Objective::new(1i64, 50);

        assert!(Objective::new(0i64, 999).improves_over(&incumbent));
        assert!(Objective::new(1i64, 49).improves_over(&incumbent));

        // Ties are rejected: no churn from no-op kicks.
        assert!(!Objective::new(1i64, 50).improves_over(&incumbent));
        assert!(!Objective::new(1i64, 51).improves_over(&incumbent));
        assert!(!Objective::new(2i64, 0).improves_over(&incumbent));
    }
}
