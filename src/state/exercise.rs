//! Exercise records, add-form input and derived view fields

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// A user-defined movement with a target set count and rest duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: u64,
    pub name: String,
    pub total_sets: u32,
    /// Always within `0..=total_sets`
    pub remaining_sets: u32,
    /// Rest between sets, in seconds
    pub rest: u64,
    /// True exactly when `remaining_sets == 0`
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    /// Create a fresh exercise with every set still to do
    pub fn new(id: u64, name: String, total_sets: u32, rest: u64) -> Self {
        Self {
            id,
            name,
            total_sets,
            remaining_sets: total_sets,
            rest,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Record one finished set. Returns false when nothing was left to do.
    pub fn complete_set(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.remaining_sets = self.remaining_sets.saturating_sub(1);
        if self.remaining_sets == 0 {
            self.completed = true;
        }
        true
    }

    pub fn completed_sets(&self) -> u32 {
        self.total_sets - self.remaining_sets
    }

    /// Share of sets done, clamped to `[0, 100]`
    pub fn progress_percent(&self) -> f64 {
        if self.total_sets == 0 {
            return 0.0;
        }
        let progress = f64::from(self.completed_sets()) / f64::from(self.total_sets) * 100.0;
        progress.clamp(0.0, 100.0)
    }

    /// 1-based number of the set the user is working towards
    pub fn next_set(&self) -> u32 {
        self.total_sets.min(self.completed_sets() + 1)
    }
}

/// Numeric form field. Accepts JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FormNumber {
    /// Whole-number value of the field, if it has one.
    ///
    /// A blank string reads as zero, the way an empty form input does.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FormNumber::Integer(n) => Some(*n),
            FormNumber::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            FormNumber::Float(_) => None,
            FormNumber::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Some(0)
                } else {
                    text.parse::<i64>().ok()
                }
            }
        }
    }
}

impl From<i64> for FormNumber {
    fn from(value: i64) -> Self {
        FormNumber::Integer(value)
    }
}

impl From<&str> for FormNumber {
    fn from(value: &str) -> Self {
        FormNumber::Text(value.to_string())
    }
}

/// Add-exercise submission as received from a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewExercise {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sets: Option<FormNumber>,
    #[serde(default)]
    pub rest: Option<FormNumber>,
}

/// Submission that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidExercise {
    pub name: String,
    pub total_sets: u32,
    pub rest: u64,
}

impl NewExercise {
    pub fn new(name: impl Into<String>, sets: i64, rest: i64) -> Self {
        Self {
            name: name.into(),
            sets: Some(sets.into()),
            rest: Some(rest.into()),
        }
    }

    /// Build a submission from raw form text
    pub fn from_form(name: &str, sets: &str, rest: &str) -> Self {
        Self {
            name: name.to_string(),
            sets: Some(sets.into()),
            rest: Some(rest.into()),
        }
    }

    /// Check the submission: trimmed name non-empty, `sets > 0`, `rest >= 0`
    pub fn validate(&self) -> Result<ValidExercise, TrackerError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidExercise("name is empty".to_string()));
        }

        let sets = self
            .sets
            .as_ref()
            .and_then(FormNumber::as_integer)
            .ok_or_else(|| TrackerError::InvalidExercise("sets is not a whole number".to_string()))?;
        if sets <= 0 {
            return Err(TrackerError::InvalidExercise(format!("sets must be positive, got {}", sets)));
        }
        let total_sets = u32::try_from(sets)
            .map_err(|_| TrackerError::InvalidExercise(format!("sets out of range: {}", sets)))?;

        let rest = self
            .rest
            .as_ref()
            .and_then(FormNumber::as_integer)
            .ok_or_else(|| TrackerError::InvalidExercise("rest is not a whole number".to_string()))?;
        let rest = u64::try_from(rest)
            .map_err(|_| TrackerError::InvalidExercise(format!("rest must not be negative, got {}", rest)))?;

        Ok(ValidExercise {
            name: name.to_string(),
            total_sets,
            rest,
        })
    }
}

/// Exercise plus the fields a page needs to render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseView {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub completed_sets: u32,
    pub progress_percent: f64,
    pub next_set: u32,
    pub resting: bool,
    pub can_complete_set: bool,
}

impl ExerciseView {
    pub fn new(exercise: &Exercise, resting: bool) -> Self {
        Self {
            completed_sets: exercise.completed_sets(),
            progress_percent: exercise.progress_percent(),
            next_set: exercise.next_set(),
            resting,
            can_complete_set: !exercise.completed && !resting,
            exercise: exercise.clone(),
        }
    }
}
