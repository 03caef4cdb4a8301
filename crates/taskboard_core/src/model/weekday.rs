//! Weekday selector values.
//!
//! # Invariants
//! - Display order starts on Monday.
//! - Persisted form is the lowercase English name (`"monday"`).

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the seven days a task can be scheduled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
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
    /// All days in selector display order.
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Stable lowercase name used in persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Capitalized name for labels and tooltips.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Single uppercase letter shown on the day selector capsule.
    pub fn letter(self) -> char {
        match self {
            Self::Monday => 'M',
            Self::Tuesday | Self::Thursday => 'T',
            Self::Wednesday => 'W',
            Self::Friday => 'F',
            Self::Saturday | Self::Sunday => 'S',
        }
    }

    /// Weekday of the local wall clock.
    pub fn today() -> Self {
        chrono::Local::now().weekday().into()
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input text did not name a weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWeekdayError(String);

impl Display for ParseWeekdayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown weekday `{}`; expected monday|tuesday|wednesday|thursday|friday|saturday|sunday",
            self.0
        )
    }
}

impl Error for ParseWeekdayError {}

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == normalized)
            .ok_or(ParseWeekdayError(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::Weekday;

    #[test]
    fn parse_accepts_any_case_and_whitespace() {
        assert_eq!(" Monday ".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("SUNDAY".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!("someday".parse::<Weekday>().is_err());
    }

    #[test]
    fn chrono_weekdays_map_one_to_one() {
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sunday);
        assert_eq!(Weekday::from(chrono::Weekday::Mon), Weekday::Monday);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&Weekday::Wednesday).unwrap(),
            "\"wednesday\""
        );
        let day: Weekday = serde_json::from_str("\"friday\"").unwrap();
        assert_eq!(day, Weekday::Friday);
    }

    #[test]
    fn labels_follow_display_name() {
        for day in Weekday::ALL {
            assert!(day.display_name().starts_with(day.letter()));
            assert_eq!(day.display_name().to_ascii_lowercase(), day.as_str());
        }
    }
}
