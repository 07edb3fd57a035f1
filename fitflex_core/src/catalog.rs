//! Default catalog of workout templates.
//!
//! The catalog is the template source sessions are built from. Lookups hand
//! out shared references; [`crate::WorkoutSession::from_template`] makes its
//! own deep copy, so the catalog is never mutated by a running workout.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// The set of workouts a user can start
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub workouts: BTreeMap<String, WorkoutTemplate>,
}

/// Browse filters; `None` fields match everything
#[derive(Clone, Debug, Default)]
pub struct CatalogFilter {
    pub query: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl CatalogFilter {
    fn matches(&self, workout: &WorkoutTemplate) -> bool {
        let matches_query = self.query.as_ref().map_or(true, |q| {
            let q = q.to_lowercase();
            workout.title.to_lowercase().contains(&q)
                || workout.description.to_lowercase().contains(&q)
        });
        let matches_category = self
            .category
            .as_ref()
            .map_or(true, |c| workout.category.eq_ignore_ascii_case(c));
        let matches_difficulty = self.difficulty.map_or(true, |d| workout.difficulty == d);

        matches_query && matches_category && matches_difficulty
    }
}

impl Catalog {
    /// Add or replace a workout, keyed by its id
    pub fn insert(&mut self, workout: WorkoutTemplate) {
        self.workouts.insert(workout.id.clone(), workout);
    }

    pub fn get(&self, id: &str) -> Option<&WorkoutTemplate> {
        self.workouts.get(id)
    }

    /// Like [`Catalog::get`], but an unknown id is an error
    pub fn template(&self, id: &str) -> Result<&WorkoutTemplate> {
        self.get(id).ok_or_else(|| Error::UnknownWorkout(id.to_string()))
    }

    /// All workouts ordered by id
    pub fn list(&self) -> Vec<&WorkoutTemplate> {
        self.workouts.values().collect()
    }

    /// Workouts matching every set field of `filter`, ordered by id
    pub fn search(&self, filter: &CatalogFilter) -> Vec<&WorkoutTemplate> {
        self.workouts.values().filter(|w| filter.matches(w)).collect()
    }

    /// Validate the catalog, returning a list of problems (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, workout) in &self.workouts {
            if id.is_empty() || workout.id.is_empty() {
                errors.push("Workout has empty ID".to_string());
            }
            if id != &workout.id {
                errors.push(format!(
                    "Workout key '{}' doesn't match workout.id '{}'",
                    id, workout.id
                ));
            }
            if workout.title.is_empty() {
                errors.push(format!("Workout '{}' has empty title", id));
            }
            if workout.exercises.is_empty() {
                errors.push(format!("Workout '{}' has no exercises", id));
            }

            let mut seen = HashSet::new();
            for exercise in &workout.exercises {
                if !seen.insert(exercise.id.as_str()) {
                    errors.push(format!(
                        "Workout '{}' repeats exercise id '{}'",
                        id, exercise.id
                    ));
                }
                if exercise.name.is_empty() {
                    errors.push(format!("Workout '{}' has an unnamed exercise", id));
                }
                if exercise.sets == 0 {
                    errors.push(format!(
                        "Exercise '{}' in '{}' prescribes no sets",
                        exercise.id, id
                    ));
                }
                if exercise.reps == 0 {
                    errors.push(format!(
                        "Exercise '{}' in '{}' prescribes no reps",
                        exercise.id, id
                    ));
                }
                if !exercise.weight.is_finite() || exercise.weight < 0.0 {
                    errors.push(format!(
                        "Exercise '{}' in '{}' has invalid weight {}",
                        exercise.id, id, exercise.weight
                    ));
                }
            }
        }

        errors
    }

    /// [`Catalog::validate`] as a `Result`, joining all problems into one error
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::CatalogValidation(errors.join("; ")))
        }
    }
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with the built-in workouts
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn exercise(id: &str, name: &str, sets: u32, reps: u32, rest_seconds: u32, weight: f64) -> ExerciseTemplate {
    ExerciseTemplate {
        id: id.into(),
        name: name.into(),
        sets,
        reps,
        rest_seconds,
        weight,
    }
}

fn build_default_catalog_internal() -> Catalog {
    let mut catalog = Catalog::default();

    catalog.insert(WorkoutTemplate {
        id: "full_body_blast".into(),
        title: "Full Body Blast".into(),
        description: "A complete workout targeting all major muscle groups for maximum results in minimal time.".into(),
        category: "Strength".into(),
        difficulty: Difficulty::Intermediate,
        duration_minutes: 45,
        exercises: vec![
            exercise("barbell_bench_press", "Barbell Bench Press", 3, 10, 60, 135.0),
            exercise("dumbbell_rows", "Dumbbell Rows", 3, 12, 45, 35.0),
            exercise("squats", "Squats", 4, 8, 90, 185.0),
        ],
    });

    catalog.insert(WorkoutTemplate {
        id: "hiit_cardio_burn".into(),
        title: "HIIT Cardio Burn".into(),
        description: "High-intensity interval training to maximize calorie burn and boost your metabolism.".into(),
        category: "Cardio".into(),
        difficulty: Difficulty::Advanced,
        duration_minutes: 30,
        exercises: vec![
            exercise("burpees", "Burpees", 4, 15, 30, 0.0),
            exercise("kettlebell_swings", "Kettlebell Swings", 4, 20, 30, 35.0),
            exercise("jump_squats", "Jump Squats", 4, 15, 30, 0.0),
            exercise("mountain_climbers", "Mountain Climbers", 4, 30, 30, 0.0),
        ],
    });

    catalog.insert(WorkoutTemplate {
        id: "beginner_bodyweight".into(),
        title: "Beginner Bodyweight".into(),
        description: "Perfect starter workout using just your bodyweight, ideal for fitness newcomers.".into(),
        category: "Bodyweight".into(),
        difficulty: Difficulty::Beginner,
        duration_minutes: 20,
        exercises: vec![
            exercise("push_ups", "Push-ups", 3, 8, 60, 0.0),
            exercise("bodyweight_squats", "Bodyweight Squats", 3, 12, 60, 0.0),
            exercise("glute_bridges", "Glute Bridges", 3, 12, 45, 0.0),
        ],
    });

    catalog.insert(WorkoutTemplate {
        id: "yoga_flow".into(),
        title: "Yoga Flow".into(),
        description: "A calming yet challenging yoga sequence to improve flexibility and mindfulness.".into(),
        category: "Yoga".into(),
        difficulty: Difficulty::Beginner,
        duration_minutes: 40,
        exercises: vec![
            exercise("sun_salutation", "Sun Salutation", 3, 5, 30, 0.0),
            exercise("warrior_sequence", "Warrior Sequence", 2, 4, 30, 0.0),
            exercise("seated_forward_fold", "Seated Forward Fold", 2, 1, 30, 0.0),
        ],
    });

    catalog
}
