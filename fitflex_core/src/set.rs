//! Exercise set model.
//!
//! A set is one attempt at an exercise with a target weight and rep count.
//! Adjustments never fail: weight is clamped at zero, rep changes that would
//! leave the set without a positive rep count are ignored, and a completed
//! set ignores adjustments until it is marked incomplete again.

use serde::{Deserialize, Serialize};

/// A single set within a workout exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    set_number: u32,
    target_reps: u32,
    target_weight: f64,
    completed: bool,
}

impl ExerciseSet {
    /// Create an incomplete set.
    ///
    /// `set_number` is 1-based within its exercise. Callers are expected to
    /// pass a positive rep count and a finite, non-negative weight; session
    /// construction validates both before calling this.
    pub fn new(set_number: u32, target_reps: u32, target_weight: f64) -> Self {
        Self {
            set_number,
            target_reps,
            target_weight,
            completed: false,
        }
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    pub fn target_reps(&self) -> u32 {
        self.target_reps
    }

    pub fn target_weight(&self) -> f64 {
        self.target_weight
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Weight moved by this set if completed, zero otherwise
    pub fn volume(&self) -> f64 {
        if self.completed {
            self.target_weight * f64::from(self.target_reps)
        } else {
            0.0
        }
    }

    /// Shift the target weight by `delta`, clamping at zero.
    ///
    /// Returns whether the weight changed. Locked (completed) sets are
    /// ignored, as are changes that would leave the weight non-finite.
    pub fn adjust_weight(&mut self, delta: f64) -> bool {
        if self.completed {
            tracing::debug!("Set {} is completed; ignoring weight change", self.set_number);
            return false;
        }
        let new_weight = (self.target_weight + delta).max(0.0);
        if !delta.is_finite() || !new_weight.is_finite() {
            return false;
        }

        let changed = new_weight != self.target_weight;
        self.target_weight = new_weight;
        changed
    }

    /// Shift the target reps by `delta`.
    ///
    /// Returns whether the reps changed. Results of zero or below leave the
    /// set untouched, as do adjustments to a completed set.
    pub fn adjust_reps(&mut self, delta: i32) -> bool {
        if self.completed {
            tracing::debug!("Set {} is completed; ignoring reps change", self.set_number);
            return false;
        }

        let new_reps = i64::from(self.target_reps) + i64::from(delta);
        if new_reps <= 0 {
            return false;
        }

        let new_reps = u32::try_from(new_reps).unwrap_or(u32::MAX);
        let changed = new_reps != self.target_reps;
        self.target_reps = new_reps;
        changed
    }

    pub fn set_completed(&mut self, value: bool) {
        self.completed = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_weight_clamps_at_zero() {
        let mut set = ExerciseSet::new(1, 10, 10.0);
        assert!(set.adjust_weight(-25.0));
        assert_eq!(set.target_weight(), 0.0);

        // Already at the floor
        assert!(!set.adjust_weight(-5.0));
        assert_eq!(set.target_weight(), 0.0);
    }

    #[test]
    fn test_reps_stay_positive() {
        let mut set = ExerciseSet::new(1, 2, 50.0);
        assert!(set.adjust_reps(-1));
        assert_eq!(set.target_reps(), 1);

        assert!(!set.adjust_reps(-1));
        assert_eq!(set.target_reps(), 1);

        assert!(!set.adjust_reps(-10));
        assert_eq!(set.target_reps(), 1);
    }

    #[test]
    fn test_completed_set_is_locked() {
        let mut set = ExerciseSet::new(2, 8, 185.0);
        set.set_completed(true);

        assert!(!set.adjust_weight(5.0));
        assert!(!set.adjust_reps(1));
        assert_eq!(set.target_weight(), 185.0);
        assert_eq!(set.target_reps(), 8);

        set.set_completed(false);
        assert!(set.adjust_weight(5.0));
        assert_eq!(set.target_weight(), 190.0);
    }

    #[test]
    fn test_non_finite_weight_delta_ignored() {
        let mut set = ExerciseSet::new(1, 10, 135.0);
        assert!(!set.adjust_weight(f64::NAN));
        assert!(!set.adjust_weight(f64::INFINITY));
        assert_eq!(set.target_weight(), 135.0);
    }

    #[test]
    fn test_weight_overflow_ignored() {
        let mut set = ExerciseSet::new(1, 10, 135.0);
        assert!(set.adjust_weight(f64::MAX));
        let near_max = set.target_weight();

        assert!(!set.adjust_weight(f64::MAX));
        assert_eq!(set.target_weight(), near_max);
        assert!(set.target_weight().is_finite());
    }

    #[test]
    fn test_zero_weight_is_allowed() {
        // Bodyweight sets carry zero weight and still count reps
        let mut set = ExerciseSet::new(1, 15, 0.0);
        set.set_completed(true);
        assert_eq!(set.volume(), 0.0);
        assert_eq!(set.target_reps(), 15);
    }

    #[test]
    fn test_volume_only_counts_completed() {
        let mut set = ExerciseSet::new(1, 10, 100.0);
        assert_eq!(set.volume(), 0.0);
        set.set_completed(true);
        assert_eq!(set.volume(), 1000.0);
    }

    #[derive(Clone, Debug)]
    enum Adjustment {
        Weight(f64),
        Reps(i32),
        Toggle,
    }

    fn adjustment() -> impl Strategy<Value = Adjustment> {
        prop_oneof![
            (-500.0f64..500.0).prop_map(Adjustment::Weight),
            (-50i32..50).prop_map(Adjustment::Reps),
            Just(Adjustment::Toggle),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: no sequence of adjustments breaks the weight/reps floors
        #[test]
        fn prop_adjustments_keep_floors(
            reps in 1u32..30,
            weight in 0.0f64..300.0,
            ops in proptest::collection::vec(adjustment(), 0..60),
        ) {
            let mut set = ExerciseSet::new(1, reps, weight);
            for op in ops {
                match op {
                    Adjustment::Weight(d) => { set.adjust_weight(d); }
                    Adjustment::Reps(d) => { set.adjust_reps(d); }
                    Adjustment::Toggle => {
                        let done = set.is_completed();
                        set.set_completed(!done);
                    }
                }
                prop_assert!(set.target_weight() >= 0.0);
                prop_assert!(set.target_reps() > 0);
            }
        }
    }
}
