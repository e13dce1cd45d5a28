use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Grid column holding this day. Column 0 is the time label.
    pub fn column(&self) -> usize {
        match self {
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
            Weekday::Sunday => 7,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Weekday::Monday),
            "tuesday" | "tue" | "tues" => Ok(Weekday::Tuesday),
            "wednesday" | "wed" => Ok(Weekday::Wednesday),
            "thursday" | "thu" | "thurs" => Ok(Weekday::Thursday),
            "friday" | "fri" => Ok(Weekday::Friday),
            "saturday" | "sat" => Ok(Weekday::Saturday),
            "sunday" | "sun" => Ok(Weekday::Sunday),
            other => Err(anyhow!(
                "Unknown day '{}': expected monday|tuesday|wednesday|thursday|friday|saturday|sunday",
                other
            )),
        }
    }
}

impl ValueEnum for Weekday {
    fn value_variants<'a>() -> &'a [Self] {
        &Weekday::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        let (name, short) = match self {
            Weekday::Monday => ("monday", "mon"),
            Weekday::Tuesday => ("tuesday", "tue"),
            Weekday::Wednesday => ("wednesday", "wed"),
            Weekday::Thursday => ("thursday", "thu"),
            Weekday::Friday => ("friday", "fri"),
            Weekday::Saturday => ("saturday", "sat"),
            Weekday::Sunday => ("sunday", "sun"),
        };
        Some(clap::builder::PossibleValue::new(name).alias(short))
    }
}

/// Closed set of task categories. Anything else folds into [`Category::Personal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Work,
    Study,
    #[default]
    Personal,
    Activity,
}

impl Category {
    /// Ordered closed set; the first entry is the codec default.
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Study,
        Category::Personal,
        Category::Activity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Study => "Study",
            Category::Personal => "Personal",
            Category::Activity => "Activity",
        }
    }

    /// Match a label against the closed set, falling back to `Personal`.
    pub fn normalize(label: &str) -> Self {
        match label.trim() {
            "Work" => Category::Work,
            "Study" => Category::Study,
            "Activity" => Category::Activity,
            _ => Category::Personal,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Category::normalize(&label))
    }
}

/// Identity of a schedulable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey {
    pub day: Weekday,
    pub time: NaiveTime,
}

impl TaskKey {
    pub fn new(day: Weekday, time: NaiveTime) -> Self {
        Self {
            day,
            time: whole_seconds(time),
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.time.format("%H:%M"))
    }
}

/// One scheduled task as persisted in the task document.
///
/// Equality covers every field; identity is only `(day, time)`, see [`TaskRecord::key`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub struct TaskRecord {
    pub title: String,
    pub day: Weekday,
    #[serde(with = "time_of_day")]
    pub time: NaiveTime,
    #[serde(default)]
    pub is_important: bool,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub category: Category,
}

impl TaskRecord {
    pub fn new(day: Weekday, time: NaiveTime, category: Category, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            day,
            time: whole_seconds(time),
            is_important: false,
            is_urgent: false,
            category,
        }
    }

    pub fn with_flags(mut self, is_important: bool, is_urgent: bool) -> Self {
        self.is_important = is_important;
        self.is_urgent = is_urgent;
        self
    }

    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.day, self.time)
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Drop sub-second precision, which the task document does not store.
fn whole_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

/// `HH:MM:SS` serialization for time-of-day values.
mod time_of_day {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = format!(
            "{:02}:{:02}:{:02}",
            time.hour(),
            time.minute(),
            time.second()
        );
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&text, "%H:%M"))
            .map_err(serde::de::Error::custom)
    }
}
