//! Period selector resolution.
//!
//! Turns a declarative [`PeriodSelector`] into the concrete [`ResolvedRange`]
//! the filter works on. Resolution is pure: "now", the festival calendar and
//! the timezone are all supplied by the caller.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::config::FestivalCalendar;
use crate::models::{
    localize, ActiveHours, FestivalLabel, PeriodSelector, ResolvedRange, TimeOfDayWindow,
};

/// Resolves selectors against a festival calendar in one timezone.
#[derive(Debug, Clone)]
pub struct RangeResolver {
    calendar: FestivalCalendar,
    timezone: Tz,
}

impl RangeResolver {
    pub fn new(calendar: FestivalCalendar, timezone: Tz) -> Self {
        Self { calendar, timezone }
    }

    pub fn calendar(&self) -> &FestivalCalendar {
        &self.calendar
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Resolve `selector` relative to `now`.
    ///
    /// `None` means "no range constraint". That covers [`PeriodSelector::All`]
    /// as well as selectors that cannot be resolved: a festival year missing
    /// from the calendar, a custom range without both dates, or a
    /// non-positive recent duration.
    pub fn resolve(
        &self,
        selector: &PeriodSelector,
        now: DateTime<FixedOffset>,
    ) -> Option<ResolvedRange> {
        match selector {
            PeriodSelector::All => None,
            PeriodSelector::Festival { year, label } => self.resolve_festival(*year, *label),
            PeriodSelector::Recent { minutes } => {
                if *minutes <= 0 {
                    log::debug!("Ignoring non-positive recent period of {} minutes", minutes);
                    return None;
                }
                let now = now.with_timezone(&self.timezone).fixed_offset();
                let start = now.checked_sub_signed(Duration::try_minutes(*minutes)?)?;
                Some(ResolvedRange::new(start, now))
            }
            PeriodSelector::Custom {
                start_date,
                end_date,
                start_time,
                end_time,
            } => {
                let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
                    return None;
                };
                let range = self.whole_days(*start_date, *end_date)?;
                Some(range.with_window(TimeOfDayWindow::custom(*start_time, *end_time)))
            }
        }
    }

    /// Window selected by an explicit active-hours choice.
    pub fn active_hours_window(&self, hours: &ActiveHours) -> Option<TimeOfDayWindow> {
        match hours {
            ActiveHours::AllHours => None,
            ActiveHours::Friday => self.calendar.window(FestivalLabel::Friday),
            ActiveHours::Saturday => self.calendar.window(FestivalLabel::Saturday),
            ActiveHours::Custom { start, end } => TimeOfDayWindow::custom(*start, *end),
        }
    }

    /// Resolve a selector and then let `hours` replace its window.
    ///
    /// An hours override without a period still restricts the time of day,
    /// over an unbounded date range.
    pub fn resolve_with_hours(
        &self,
        selector: &PeriodSelector,
        hours: Option<&ActiveHours>,
        now: DateTime<FixedOffset>,
    ) -> Option<ResolvedRange> {
        let range = self.resolve(selector, now);
        let Some(hours) = hours else {
            return range;
        };
        let window = self.active_hours_window(hours);
        match range {
            Some(range) => Some(range.with_window(window)),
            None => window.map(|w| ResolvedRange::unbounded().with_window(Some(w))),
        }
    }

    fn resolve_festival(&self, year: i32, label: FestivalLabel) -> Option<ResolvedRange> {
        let Some(edition) = self.calendar.edition(year) else {
            log::warn!("No festival edition configured for {}", year);
            return None;
        };
        let (first, last) = edition.days(label);
        let range = self.whole_days(first, last)?;
        Some(range.with_window(self.calendar.window(label)))
    }

    /// `first 00:00:00` through `last 23:59:59` in the configured timezone.
    fn whole_days(&self, first: NaiveDate, last: NaiveDate) -> Option<ResolvedRange> {
        let start = localize(first.and_time(NaiveTime::MIN), self.timezone)?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
        let end = localize(last.and_time(end_of_day), self.timezone)?;
        Some(ResolvedRange::whole_days(start, end))
    }
}

#[cfg(test)]
#[path = "range_resolver_tests.rs"]
mod range_resolver_tests;
