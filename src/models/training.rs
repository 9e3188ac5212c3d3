// SPDX-License-Identifier: MIT

//! Training week, multi-week plan, and historical summary models.

use serde::{Deserialize, Serialize};

use crate::models::{Day, SessionType};

/// One planned session in the current or upcoming week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSession {
    pub day: Day,
    pub session_type: SessionType,
    /// Distance in miles
    pub distance: f64,
    /// Concise coach notes, e.g. "2x2mi @ 10k pace"
    #[serde(default)]
    pub notes: String,
}

/// A completed activity with its metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedActivity {
    pub day_of_week: Day,
    pub distance_in_miles: f64,
    /// Activity date (ISO 8601), when the backend includes it
    #[serde(default)]
    pub date: Option<String>,
}

/// A completed activity paired with the coach's commentary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedActivity {
    pub activity: CompletedActivity,
    #[serde(default)]
    pub coach_notes: String,
}

/// Remaining sessions for the week.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FutureWeek {
    #[serde(default)]
    pub sessions: Vec<TrainingSession>,
}

/// Structured plan for the current week: what happened plus what's left.
///
/// Returned directly (no envelope) by `GET /training-week/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingWeek {
    #[serde(default)]
    pub past_training_week: Vec<EnrichedActivity>,
    #[serde(default)]
    pub future_training_week: FutureWeek,
}

impl TrainingWeek {
    /// Miles already run this week.
    pub fn completed_mileage(&self) -> f64 {
        self.past_training_week
            .iter()
            .map(|e| e.activity.distance_in_miles)
            .sum()
    }

    /// Miles already run plus miles still planned.
    pub fn total_mileage(&self) -> f64 {
        self.completed_mileage()
            + self
                .future_training_week
                .sessions
                .iter()
                .map(|s| s.distance)
                .sum::<f64>()
    }
}

/// Aggregated historical week. The backend returns these newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    /// Monday of the summarized week
    pub week_start: chrono::NaiveDate,
    /// Total distance in miles
    pub total_distance: f64,
    /// Longest single run that week, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longest_run: Option<f64>,
}

/// Phase of a training block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekType {
    Build,
    Peak,
    Taper,
    Race,
    Maintenance,
}

/// One week of the multi-week plan leading up to the race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPlanWeek {
    pub week_start_date: chrono::NaiveDate,
    pub week_number: u32,
    pub n_weeks_until_race: u32,
    pub week_type: WeekType,
    /// Target weekly volume in miles
    pub total_distance: f64,
    /// Target long-run distance in miles
    pub long_run_distance: f64,
    #[serde(default)]
    pub notes: String,
}

/// Full plan from today until race day, returned directly by
/// `GET /training-plan/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingPlan {
    #[serde(default)]
    pub training_plan_weeks: Vec<TrainingPlanWeek>,
}
