// SPDX-License-Identifier: MIT

//! User profile and training-preference models.

use serde::{Deserialize, Deserializer, Serialize};

/// Day of the week as the backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Mon,
    Tues,
    Wed,
    Thurs,
    Fri,
    Sat,
    Sun,
}

impl Day {
    /// All seven days, Monday first.
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tues,
        Day::Wed,
        Day::Thurs,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];
}

/// Kind of training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "easy run")]
    Easy,
    #[serde(rename = "long run")]
    Long,
    #[serde(rename = "speed workout")]
    Speed,
    #[serde(rename = "rest day")]
    Rest,
    #[serde(rename = "moderate run")]
    Moderate,
}

/// Target race distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceDistance {
    #[serde(rename = "5K")]
    FiveKilometer,
    #[serde(rename = "10K")]
    TenKilometer,
    #[serde(rename = "Half Marathon")]
    HalfMarathon,
    #[serde(rename = "Marathon")]
    Marathon,
    #[serde(rename = "Ultra Marathon")]
    UltraMarathon,
    #[serde(rename = "none")]
    None,
}

/// One preferred (day, session type) pairing in the ideal training week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdealSession {
    pub day: Day,
    pub session_type: SessionType,
}

/// User training preferences, POSTed to `/preferences/` as JSON with
/// ISO-8601 dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_distance: Option<RaceDistance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_date: Option<chrono::NaiveDate>,
    /// At most one entry per day; use [`Preferences::set_day`] to keep the
    /// invariant.
    #[serde(default)]
    pub ideal_training_week: Vec<IdealSession>,
}

impl Preferences {
    /// Set the preferred session type for a day, replacing any existing
    /// entry for that day. Days stay unique.
    pub fn set_day(&mut self, day: Day, session_type: SessionType) {
        if let Some(existing) = self.ideal_training_week.iter_mut().find(|s| s.day == day) {
            existing.session_type = session_type;
        } else {
            self.ideal_training_week.push(IdealSession { day, session_type });
        }
    }

    /// Remove any preference for a day (absent day = no preference).
    pub fn clear_day(&mut self, day: Day) {
        self.ideal_training_week.retain(|s| s.day != day);
    }

    /// The preferred session type for a day, if any.
    pub fn day(&self, day: Day) -> Option<SessionType> {
        self.ideal_training_week
            .iter()
            .find(|s| s.day == day)
            .map(|s| s.session_type)
    }
}

/// Server-side user profile snapshot from `GET /profile/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub firstname: String,
    pub lastname: String,
    /// Email address (may be None until onboarding captures one)
    pub email: Option<String>,
    /// Avatar URL
    #[serde(rename = "profile")]
    pub avatar_url: Option<String>,
    /// Premium subscriber flag
    #[serde(default)]
    pub is_premium: bool,
    /// When the user joined (ISO 8601)
    pub member_since: Option<String>,
    /// The backend embeds preferences either as a nested object or as a
    /// JSON-encoded string; both shapes are accepted.
    #[serde(default, deserialize_with = "nested_or_json_string")]
    pub preferences: Preferences,
}

/// Ordered-fallback decode: nested `Preferences` object first, then a
/// string holding JSON-encoded `Preferences`.
fn nested_or_json_string<'de, D>(deserializer: D) -> Result<Preferences, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Nested(Preferences),
        Encoded(String),
    }

    match Wire::deserialize(deserializer)? {
        Wire::Nested(prefs) => Ok(prefs),
        Wire::Encoded(raw) => serde_json::from_str(&raw).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_day_keeps_days_unique() {
        let mut prefs = Preferences::default();
        prefs.set_day(Day::Mon, SessionType::Easy);
        prefs.set_day(Day::Tues, SessionType::Rest);
        prefs.set_day(Day::Mon, SessionType::Long);

        assert_eq!(prefs.ideal_training_week.len(), 2);
        assert_eq!(prefs.day(Day::Mon), Some(SessionType::Long));
        assert_eq!(prefs.day(Day::Tues), Some(SessionType::Rest));
    }

    #[test]
    fn test_clear_day() {
        let mut prefs = Preferences::default();
        prefs.set_day(Day::Sun, SessionType::Long);
        prefs.clear_day(Day::Sun);

        assert_eq!(prefs.day(Day::Sun), None);
        assert!(prefs.ideal_training_week.is_empty());
    }

    #[test]
    fn test_preferences_serialize_iso_dates() {
        let prefs = Preferences {
            race_distance: Some(RaceDistance::Marathon),
            race_date: chrono::NaiveDate::from_ymd_opt(2024, 10, 13),
            ideal_training_week: vec![IdealSession {
                day: Day::Sat,
                session_type: SessionType::Long,
            }],
        };

        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["race_distance"], "Marathon");
        assert_eq!(json["race_date"], "2024-10-13");
        assert_eq!(json["ideal_training_week"][0]["day"], "sat");
        assert_eq!(json["ideal_training_week"][0]["session_type"], "long run");
    }

    #[test]
    fn test_profile_decodes_nested_preferences() {
        let raw = r#"{
            "firstname": "Jane",
            "lastname": "Doe",
            "email": "jane@example.com",
            "profile": "https://cdn.example.com/jane.png",
            "is_premium": true,
            "member_since": "2023-06-01",
            "preferences": {"race_distance": "10K", "ideal_training_week": []}
        }"#;

        let profile: ProfileRecord = serde_json::from_str(raw).unwrap();
        assert!(profile.is_premium);
        assert_eq!(
            profile.preferences.race_distance,
            Some(RaceDistance::TenKilometer)
        );
    }

    #[test]
    fn test_profile_decodes_string_encoded_preferences() {
        // The backend historically returned preferences as a JSON string
        let raw = r#"{
            "firstname": "Jane",
            "lastname": "Doe",
            "email": null,
            "profile": null,
            "member_since": null,
            "preferences": "{\"race_distance\": \"5K\", \"race_date\": \"2024-05-04\"}"
        }"#;

        let profile: ProfileRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(
            profile.preferences.race_distance,
            Some(RaceDistance::FiveKilometer)
        );
        assert_eq!(
            profile.preferences.race_date,
            chrono::NaiveDate::from_ymd_opt(2024, 5, 4)
        );
        assert!(!profile.is_premium);
    }

    #[test]
    fn test_profile_rejects_garbage_preferences_string() {
        let raw = r#"{
            "firstname": "Jane",
            "lastname": "Doe",
            "email": null,
            "profile": null,
            "member_since": null,
            "preferences": "not json at all"
        }"#;

        assert!(serde_json::from_str::<ProfileRecord>(raw).is_err());
    }
}
