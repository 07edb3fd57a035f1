//! Core domain types for the FitFlex workout tracker.
//!
//! This module defines the plain data shapes shared across the system:
//! - Workout templates from the catalog
//! - Session lifecycle status
//! - Completed session records handed to persistence
//! - Progress summaries and history entries produced by aggregation

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Template Types
// ============================================================================

/// Difficulty rating shown in the workout catalog
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Parse a difficulty name, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        };
        f.write_str(name)
    }
}

/// Prescription for a single exercise within a workout template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseTemplate {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    /// Starting weight for every set (zero for bodyweight work)
    pub weight: f64,
}

/// A workout as listed in the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub exercises: Vec<ExerciseTemplate>,
}

// ============================================================================
// Session Status
// ============================================================================

/// Lifecycle of a workout session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    Active,
    Paused,
    Finished,
    Abandoned,
}

impl SessionStatus {
    /// Finished and Abandoned sessions accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Finished | SessionStatus::Abandoned)
    }

    /// Active or Paused
    pub fn is_in_progress(self) -> bool {
        matches!(self, SessionStatus::Active | SessionStatus::Paused)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::NotStarted => "not started",
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Finished => "finished",
            SessionStatus::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Completed Session Record
// ============================================================================

/// One set as it stood when the session finished
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecordedSet {
    pub exercise_name: String,
    pub exercise_order: u32,
    pub set_number: u32,
    pub target_reps: u32,
    pub target_weight: f64,
    pub completed: bool,
}

impl RecordedSet {
    /// `weight × reps` for completed sets, zero otherwise
    pub fn volume(&self) -> f64 {
        if self.completed {
            self.target_weight * f64::from(self.target_reps)
        } else {
            0.0
        }
    }
}

/// The record emitted by a finished session and handed to storage
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletedSessionRecord {
    pub id: Uuid,
    pub user_id: String,
    pub workout_id: String,
    pub workout_title: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub sets: Vec<RecordedSet>,
    pub total_volume: f64,
}

// ============================================================================
// Aggregation Output
// ============================================================================

/// A single point of the volume trend (one per session)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub volume: f64,
}

/// Summary statistics derived from a user's history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ProgressSummary {
    pub completed_workouts_count: usize,
    pub total_weight_lifted: f64,
    pub recent_trend: Vec<TrendPoint>,
}

impl ProgressSummary {
    /// Number of sessions inside the trailing window
    pub fn recent_workouts_count(&self) -> usize {
        self.recent_trend.len()
    }
}

/// A row of the recent workouts list
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub record_id: Uuid,
    pub workout_title: String,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub completed_sets: usize,
    pub total_sets: usize,
    pub volume: f64,
}
