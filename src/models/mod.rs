// SPDX-License-Identifier: MIT

//! Data models for the backend contract.

pub mod profile;
pub mod training;

pub use profile::{Day, IdealSession, Preferences, ProfileRecord, RaceDistance, SessionType};
pub use training::{
    CompletedActivity, EnrichedActivity, FutureWeek, TrainingPlan, TrainingPlanWeek,
    TrainingSession, TrainingWeek, WeekSummary, WeekType,
};
