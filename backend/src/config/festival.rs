//! Festival calendar: which dates each edition runs on and its canonical hours.
//!
//! The calendar is plain data. Adding an edition is a configuration change:
//!
//! ```toml
//! [[festival.editions]]
//! year = 2026
//! friday = "2026-07-31"
//! saturday = "2026-08-01"
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FestivalLabel, TimeOfDay, TimeOfDayWindow};

/// Start/end pair of canonical festival hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursPair {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl HoursPair {
    fn at(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start: TimeOfDay::new(start_hour, 0).unwrap_or(TimeOfDay::MIDNIGHT),
            end: TimeOfDay::new(end_hour, 0).unwrap_or(TimeOfDay::MIDNIGHT),
        }
    }

    pub fn window(&self) -> TimeOfDayWindow {
        TimeOfDayWindow::new(self.start, self.end)
    }
}

/// Canonical opening hours per festival day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalHours {
    pub friday: HoursPair,
    pub saturday: HoursPair,
}

impl Default for FestivalHours {
    fn default() -> Self {
        Self {
            friday: HoursPair::at(18, 2),
            saturday: HoursPair::at(13, 2),
        }
    }
}

/// The two festival days of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalEdition {
    pub year: i32,
    pub friday: NaiveDate,
    pub saturday: NaiveDate,
}

impl FestivalEdition {
    /// First and last calendar day covered by `label`.
    pub fn days(&self, label: FestivalLabel) -> (NaiveDate, NaiveDate) {
        match label {
            FestivalLabel::Full => (self.friday, self.saturday),
            FestivalLabel::Friday => (self.friday, self.friday),
            FestivalLabel::Saturday => (self.saturday, self.saturday),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FestivalSection {
    #[serde(default)]
    hours: FestivalHours,
    #[serde(default)]
    editions: Vec<FestivalEdition>,
}

/// Year-indexed festival calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FestivalSection", into = "FestivalSection")]
pub struct FestivalCalendar {
    hours: FestivalHours,
    editions: BTreeMap<i32, FestivalEdition>,
}

impl From<FestivalSection> for FestivalCalendar {
    fn from(section: FestivalSection) -> Self {
        let mut calendar = FestivalCalendar::empty(section.hours);
        for edition in section.editions {
            calendar.insert(edition);
        }
        calendar
    }
}

impl From<FestivalCalendar> for FestivalSection {
    fn from(calendar: FestivalCalendar) -> Self {
        Self {
            hours: calendar.hours,
            editions: calendar.editions.into_values().collect(),
        }
    }
}

impl Default for FestivalCalendar {
    fn default() -> Self {
        let mut calendar = FestivalCalendar::empty(FestivalHours::default());
        for (year, friday, saturday) in [(2024, (8, 2), (8, 3)), (2025, (8, 1), (8, 2))] {
            if let (Some(friday), Some(saturday)) = (
                NaiveDate::from_ymd_opt(year, friday.0, friday.1),
                NaiveDate::from_ymd_opt(year, saturday.0, saturday.1),
            ) {
                calendar.insert(FestivalEdition {
                    year,
                    friday,
                    saturday,
                });
            }
        }
        calendar
    }
}

impl FestivalCalendar {
    pub fn empty(hours: FestivalHours) -> Self {
        Self {
            hours,
            editions: BTreeMap::new(),
        }
    }

    /// Add or replace the edition for its year.
    pub fn insert(&mut self, edition: FestivalEdition) {
        if self.editions.insert(edition.year, edition).is_some() {
            log::warn!("Festival edition {} defined twice; keeping the last", edition.year);
        }
    }

    pub fn edition(&self, year: i32) -> Option<&FestivalEdition> {
        self.editions.get(&year)
    }

    pub fn editions(&self) -> impl Iterator<Item = &FestivalEdition> {
        self.editions.values()
    }

    pub fn hours(&self) -> &FestivalHours {
        &self.hours
    }

    /// Canonical window for a festival label. `Full` spans whole days.
    pub fn window(&self, label: FestivalLabel) -> Option<TimeOfDayWindow> {
        match label {
            FestivalLabel::Full => None,
            FestivalLabel::Friday => Some(self.hours.friday.window()),
            FestivalLabel::Saturday => Some(self.hours.saturday.window()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calendar_has_known_years() {
        let calendar = FestivalCalendar::default();
        let e2024 = calendar.edition(2024).unwrap();
        assert_eq!(e2024.friday, NaiveDate::from_ymd_opt(2024, 8, 2).unwrap());
        assert_eq!(e2024.saturday, NaiveDate::from_ymd_opt(2024, 8, 3).unwrap());
        let e2025 = calendar.edition(2025).unwrap();
        assert_eq!(e2025.friday, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert!(calendar.edition(2023).is_none());
    }

    #[test]
    fn test_default_hours_are_overnight() {
        let calendar = FestivalCalendar::default();
        let friday = calendar.window(FestivalLabel::Friday).unwrap();
        assert_eq!(friday.start.to_string(), "18:00");
        assert_eq!(friday.end.to_string(), "02:00");
        assert!(friday.overnight);
        let saturday = calendar.window(FestivalLabel::Saturday).unwrap();
        assert_eq!(saturday.start.to_string(), "13:00");
        assert!(saturday.overnight);
        assert!(calendar.window(FestivalLabel::Full).is_none());
    }

    #[test]
    fn test_edition_days() {
        let calendar = FestivalCalendar::default();
        let edition = calendar.edition(2024).unwrap();
        let (start, end) = edition.days(FestivalLabel::Full);
        assert_eq!((start.to_string(), end.to_string()), ("2024-08-02".into(), "2024-08-03".into()));
        let (start, end) = edition.days(FestivalLabel::Saturday);
        assert_eq!(start, end);
    }

    #[test]
    fn test_parse_calendar_from_toml() {
        let toml = r#"
[hours]
friday = { start = "19:00", end = "03:00" }
saturday = { start = "12:00", end = "01:30" }

[[editions]]
year = 2026
friday = "2026-07-31"
saturday = "2026-08-01"
"#;
        let calendar: FestivalCalendar = toml::from_str(toml).unwrap();
        assert!(calendar.edition(2024).is_none());
        let edition = calendar.edition(2026).unwrap();
        assert_eq!(edition.saturday, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert_eq!(calendar.hours().saturday.end.to_string(), "01:30");
    }

    #[test]
    fn test_insert_replaces_year() {
        let mut calendar = FestivalCalendar::default();
        calendar.insert(FestivalEdition {
            year: 2024,
            friday: NaiveDate::from_ymd_opt(2024, 7, 26).unwrap(),
            saturday: NaiveDate::from_ymd_opt(2024, 7, 27).unwrap(),
        });
        assert_eq!(calendar.editions().count(), 2);
        assert_eq!(
            calendar.edition(2024).unwrap().friday,
            NaiveDate::from_ymd_opt(2024, 7, 26).unwrap()
        );
    }
}
