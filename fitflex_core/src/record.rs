//! Completed session records.
//!
//! `WorkoutSession::finish` is the only producer of a
//! [`CompletedSessionRecord`]. Every set of every exercise is recorded,
//! completed or not, and the record's volume counts completed sets only.

use crate::session::WorkoutSession;
use crate::{CompletedSessionRecord, RecordedSet};
use chrono::{DateTime, Utc};

/// Sum of `weight × reps` over the completed sets
pub fn sets_volume<'a, I>(sets: I) -> f64
where
    I: IntoIterator<Item = &'a RecordedSet>,
{
    sets.into_iter().map(RecordedSet::volume).sum()
}

/// Build the record for a session that is transitioning to Finished
pub(crate) fn emit(
    session: &WorkoutSession,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
) -> CompletedSessionRecord {
    let sets: Vec<RecordedSet> = session
        .exercises()
        .iter()
        .flat_map(|exercise| {
            exercise.sets().iter().map(move |set| RecordedSet {
                exercise_name: exercise.name().to_string(),
                exercise_order: exercise.order(),
                set_number: set.set_number(),
                target_reps: set.target_reps(),
                target_weight: set.target_weight(),
                completed: set.is_completed(),
            })
        })
        .collect();

    let total_volume = sets_volume(&sets);

    CompletedSessionRecord {
        id: session.id(),
        user_id: session.user_id().to_string(),
        workout_id: session.workout_id().to_string(),
        workout_title: session.workout_title().to_string(),
        started_at,
        completed_at,
        duration_seconds: session.elapsed_seconds(),
        sets,
        total_volume,
    }
}

impl CompletedSessionRecord {
    /// Sets the user marked complete, in exercise order
    pub fn completed_sets(&self) -> impl Iterator<Item = &RecordedSet> {
        self.sets.iter().filter(|s| s.completed)
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Volume derived from the recorded sets.
    ///
    /// Matches `total_volume` for records produced by `finish`; the
    /// aggregator uses this rather than trusting a stored total.
    pub fn recompute_volume(&self) -> f64 {
        sets_volume(&self.sets)
    }
}
