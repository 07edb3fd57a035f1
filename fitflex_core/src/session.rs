//! Workout session state machine.
//!
//! A session walks an ordered list of exercises under the lifecycle
//!
//! ```text
//! NotStarted -> Active <-> Paused -> Finished
//!                  \         /
//!                   Abandoned
//! ```
//!
//! Exercises are traversed strictly in order: the cursor only moves one
//! step forward or back, and `finish` is only accepted on the last
//! exercise. The elapsed clock advances solely through [`WorkoutSession::tick`],
//! which the caller drives; nothing here owns a timer.
//!
//! Every rejected operation returns an error and leaves the session exactly
//! as it was.

use crate::set::ExerciseSet;
use crate::{
    CompletedSessionRecord, Error, ExerciseTemplate, Result, SessionStatus, WorkoutTemplate,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An exercise as performed in a live session, owning its sets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutExercise {
    id: String,
    name: String,
    sets_count: u32,
    reps_per_set: u32,
    rest_seconds: u32,
    order: u32,
    sets: Vec<ExerciseSet>,
}

impl WorkoutExercise {
    fn from_template(template: &ExerciseTemplate, order: u32) -> Self {
        let sets = (1..=template.sets)
            .map(|n| ExerciseSet::new(n, template.reps, template.weight))
            .collect();

        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            sets_count: template.sets,
            reps_per_set: template.reps,
            rest_seconds: template.rest_seconds,
            order,
            sets,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sets_count(&self) -> u32 {
        self.sets_count
    }

    pub fn reps_per_set(&self) -> u32 {
        self.reps_per_set
    }

    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    /// 1-based position in the session
    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn sets(&self) -> &[ExerciseSet] {
        &self.sets
    }

    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.is_completed()).count()
    }
}

/// A single user's live workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    id: Uuid,
    user_id: String,
    workout_id: String,
    workout_title: String,
    exercises: Vec<WorkoutExercise>,
    current_exercise_index: usize,
    elapsed_seconds: u64,
    status: SessionStatus,
    started_at: Option<DateTime<Utc>>,
}

impl WorkoutSession {
    /// Instantiate a session from a catalog template.
    ///
    /// The template is deep-copied: the session never shares exercises or
    /// sets with it, so edits during the workout leave the template intact.
    pub fn from_template(user_id: impl Into<String>, template: &WorkoutTemplate) -> Result<Self> {
        validate_template(template)?;

        let exercises = template
            .exercises
            .iter()
            .zip(1u32..)
            .map(|(exercise, order)| WorkoutExercise::from_template(exercise, order))
            .collect();

        let session = Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            workout_id: template.id.clone(),
            workout_title: template.title.clone(),
            exercises,
            current_exercise_index: 0,
            elapsed_seconds: 0,
            status: SessionStatus::NotStarted,
            started_at: None,
        };

        tracing::debug!(
            "Created session {} for workout '{}' ({} exercises)",
            session.id,
            session.workout_id,
            session.exercises.len()
        );

        Ok(session)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    pub fn workout_title(&self) -> &str {
        &self.workout_title
    }

    pub fn exercises(&self) -> &[WorkoutExercise] {
        &self.exercises
    }

    pub fn exercise(&self, index: usize) -> Result<&WorkoutExercise> {
        self.exercises.get(index).ok_or(Error::OutOfRange {
            collection: "exercise",
            index,
            len: self.exercises.len(),
        })
    }

    pub fn current_exercise_index(&self) -> usize {
        self.current_exercise_index
    }

    pub fn current_exercise(&self) -> &WorkoutExercise {
        &self.exercises[self.current_exercise_index]
    }

    pub fn is_last_exercise(&self) -> bool {
        self.current_exercise_index + 1 == self.exercises.len()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// `(completed sets, total sets)` across the whole session
    pub fn progress(&self) -> (usize, usize) {
        self.exercises.iter().fold((0, 0), |(done, total), e| {
            (done + e.completed_sets(), total + e.sets.len())
        })
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start or resume the session, stamping the start time now
    pub fn start(&mut self) -> Result<()> {
        self.start_at(Utc::now())
    }

    /// Start or resume the session.
    ///
    /// `now` is recorded as the start time on the first call only.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.status {
            SessionStatus::NotStarted | SessionStatus::Paused => {}
            other => {
                return Err(Error::invalid_transition(
                    "start",
                    format!("session is {}", other),
                ))
            }
        }

        if self.started_at.is_none() {
            self.started_at = Some(now);
            tracing::info!("Session {} started at {}", self.id, now);
        } else {
            tracing::info!("Session {} resumed at {}s", self.id, self.elapsed_seconds);
        }
        self.status = SessionStatus::Active;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.status != SessionStatus::Active {
            return Err(Error::invalid_transition(
                "pause",
                format!("session is {}", self.status),
            ));
        }

        self.status = SessionStatus::Paused;
        tracing::info!("Session {} paused at {}s", self.id, self.elapsed_seconds);
        Ok(())
    }

    /// Advance the clock by one second if Active; returns the elapsed total.
    pub fn tick(&mut self) -> u64 {
        if self.status == SessionStatus::Active {
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        } else {
            tracing::trace!("Tick ignored while session is {}", self.status);
        }
        self.elapsed_seconds
    }

    /// Finish the session on its last exercise, stamping completion now
    pub fn finish(&mut self) -> Result<CompletedSessionRecord> {
        self.finish_at(Utc::now())
    }

    /// Finish the session and emit its record.
    ///
    /// Only accepted while Active or Paused with the cursor on the last
    /// exercise. A session that was never started cannot finish, even on a
    /// single-exercise workout. The record's duration is the elapsed clock,
    /// so paused time is never counted.
    pub fn finish_at(&mut self, now: DateTime<Utc>) -> Result<CompletedSessionRecord> {
        if !self.status.is_in_progress() {
            return Err(Error::invalid_transition(
                "finish",
                format!("session is {}", self.status),
            ));
        }
        if !self.is_last_exercise() {
            return Err(Error::invalid_transition(
                "finish",
                format!(
                    "on exercise {} of {}",
                    self.current_exercise_index + 1,
                    self.exercises.len()
                ),
            ));
        }
        let started_at = self
            .started_at
            .ok_or_else(|| Error::invalid_transition("finish", "session has no start time"))?;

        self.status = SessionStatus::Finished;
        let record = crate::record::emit(self, started_at, now);

        tracing::info!(
            "Session {} finished: {}s, {}/{} sets, volume {}",
            self.id,
            record.duration_seconds,
            record.completed_sets().count(),
            record.set_count(),
            record.total_volume
        );

        Ok(record)
    }

    /// Abandon the session; no record is produced.
    pub fn abandon(&mut self) -> Result<()> {
        if !self.status.is_in_progress() {
            return Err(Error::invalid_transition(
                "abandon",
                format!("session is {}", self.status),
            ));
        }

        self.status = SessionStatus::Abandoned;
        tracing::info!("Session {} abandoned at {}s", self.id, self.elapsed_seconds);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Exercise traversal
    // ------------------------------------------------------------------

    /// Move to the next exercise and return its index.
    ///
    /// Rejected on the last exercise; callers finish the session instead.
    pub fn advance_exercise(&mut self) -> Result<usize> {
        self.ensure_editable("advance exercise")?;
        if self.is_last_exercise() {
            return Err(Error::invalid_transition(
                "advance exercise",
                "already on the last exercise; finish the session instead",
            ));
        }

        self.current_exercise_index += 1;
        tracing::debug!(
            "Session {} advanced to exercise {}",
            self.id,
            self.current_exercise_index
        );
        Ok(self.current_exercise_index)
    }

    /// Move back one exercise; stays put on the first. Returns the index.
    pub fn retreat_exercise(&mut self) -> Result<usize> {
        self.ensure_editable("retreat exercise")?;
        if self.current_exercise_index > 0 {
            self.current_exercise_index -= 1;
            tracing::debug!(
                "Session {} moved back to exercise {}",
                self.id,
                self.current_exercise_index
            );
        }
        Ok(self.current_exercise_index)
    }

    // ------------------------------------------------------------------
    // Set operations
    // ------------------------------------------------------------------

    /// Flip the completion flag of a set; returns the new flag.
    pub fn toggle_set_completion(&mut self, exercise_index: usize, set_index: usize) -> Result<bool> {
        let set = self.set_mut("toggle set", exercise_index, set_index)?;
        let completed = !set.is_completed();
        set.set_completed(completed);
        tracing::debug!(
            "Exercise {} set {} completed={}",
            exercise_index,
            set_index,
            completed
        );
        Ok(completed)
    }

    /// Adjust a set's weight; returns whether it changed (see [`ExerciseSet::adjust_weight`]).
    pub fn adjust_set_weight(
        &mut self,
        exercise_index: usize,
        set_index: usize,
        delta: f64,
    ) -> Result<bool> {
        let set = self.set_mut("adjust weight", exercise_index, set_index)?;
        Ok(set.adjust_weight(delta))
    }

    /// Adjust a set's reps; returns whether they changed (see [`ExerciseSet::adjust_reps`]).
    pub fn adjust_set_reps(
        &mut self,
        exercise_index: usize,
        set_index: usize,
        delta: i32,
    ) -> Result<bool> {
        let set = self.set_mut("adjust reps", exercise_index, set_index)?;
        Ok(set.adjust_reps(delta))
    }

    fn ensure_editable(&self, operation: &'static str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::invalid_transition(
                operation,
                format!("session is {}", self.status),
            ));
        }
        Ok(())
    }

    fn set_mut(
        &mut self,
        operation: &'static str,
        exercise_index: usize,
        set_index: usize,
    ) -> Result<&mut ExerciseSet> {
        self.ensure_editable(operation)?;

        let exercise_count = self.exercises.len();
        let exercise = self
            .exercises
            .get_mut(exercise_index)
            .ok_or(Error::OutOfRange {
                collection: "exercise",
                index: exercise_index,
                len: exercise_count,
            })?;

        let set_count = exercise.sets.len();
        exercise.sets.get_mut(set_index).ok_or(Error::OutOfRange {
            collection: "set",
            index: set_index,
            len: set_count,
        })
    }

    /// Check the structural invariants of a session restored from outside
    /// (e.g. a suspended snapshot).
    pub fn check_invariants(&self) -> Result<()> {
        if self.exercises.is_empty() {
            return Err(Error::InvalidTemplate("session has no exercises".into()));
        }
        if self.current_exercise_index >= self.exercises.len() {
            return Err(Error::OutOfRange {
                collection: "exercise",
                index: self.current_exercise_index,
                len: self.exercises.len(),
            });
        }
        for (exercise, expected_order) in self.exercises.iter().zip(1u32..) {
            if exercise.order != expected_order {
                return Err(Error::InvalidTemplate(format!(
                    "exercise '{}' has order {}, expected {}",
                    exercise.name, exercise.order, expected_order
                )));
            }
            for (set, expected_number) in exercise.sets.iter().zip(1u32..) {
                if set.set_number() != expected_number || set.target_reps() == 0 {
                    return Err(Error::InvalidTemplate(format!(
                        "exercise '{}' has a malformed set {}",
                        exercise.name,
                        set.set_number()
                    )));
                }
            }
        }
        if self.status != SessionStatus::NotStarted && self.started_at.is_none() {
            return Err(Error::InvalidTemplate(format!(
                "{} session has no start time",
                self.status
            )));
        }
        Ok(())
    }
}

/// Reject templates that could not seed a well-formed session
fn validate_template(template: &WorkoutTemplate) -> Result<()> {
    if template.exercises.is_empty() {
        return Err(Error::InvalidTemplate(format!(
            "workout '{}' has no exercises",
            template.id
        )));
    }

    for exercise in &template.exercises {
        if exercise.sets == 0 || exercise.reps == 0 {
            return Err(Error::InvalidTemplate(format!(
                "exercise '{}' must prescribe at least one set and one rep",
                exercise.name
            )));
        }
        if !exercise.weight.is_finite() || exercise.weight < 0.0 {
            return Err(Error::InvalidTemplate(format!(
                "exercise '{}' has invalid weight {}",
                exercise.name, exercise.weight
            )));
        }
    }

    Ok(())
}

/// Render elapsed seconds as `HH:MM:SS`
pub fn format_elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
