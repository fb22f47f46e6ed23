//! Simulation clock. Walks the calendar one day at a time.

use crate::{
    error::{SimError, SimResult},
    types::{SimDate, Timestamp},
};
use chrono::{Days, Duration};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub start_date:    SimDate,
    pub duration_days: u64,
    /// Days already simulated.
    pub elapsed_days:  u64,
}

impl SimClock {
    pub fn new(start_date: SimDate, duration_days: u64) -> Self {
        Self {
            start_date,
            duration_days,
            elapsed_days: 0,
        }
    }

    /// Start the next day. Returns its date, or None once the horizon is reached.
    /// `start_date` is the opening date; the first simulated day is the one after.
    pub fn advance(&mut self) -> SimResult<Option<SimDate>> {
        if self.is_finished() {
            return Ok(None);
        }
        let date = add_days(self.start_date, self.elapsed_days + 1)?;
        self.elapsed_days += 1;
        Ok(Some(date))
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_days >= self.duration_days
    }

    /// Last day the simulation covers.
    pub fn end_date(&self) -> SimResult<SimDate> {
        add_days(self.start_date, self.duration_days)
    }
}

pub fn add_days(date: SimDate, days: u64) -> SimResult<SimDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| SimError::DateOverflow(format!("{date} + {days} days")))
}

pub fn add_hours(ts: Timestamp, hours: i64) -> SimResult<Timestamp> {
    ts.checked_add_signed(Duration::hours(hours))
        .ok_or_else(|| SimError::DateOverflow(format!("{ts} + {hours} hours")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn walks_exactly_duration_days_after_the_start_date() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
        let mut clock = SimClock::new(start, 3);
        let mut days = Vec::new();
        while let Some(d) = clock.advance().unwrap() {
            days.push(d);
        }
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            ]
        );
        assert!(clock.is_finished());
        assert_eq!(clock.end_date().unwrap(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }

    #[test]
    fn default_horizon_ends_on_june_thirtieth() {
        let mut clock = SimClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 180);
        let first = clock.advance().unwrap().unwrap();
        let mut last = first;
        while let Some(d) = clock.advance().unwrap() {
            last = d;
        }
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn date_overflow_is_an_error() {
        assert!(matches!(add_days(NaiveDate::MAX, 1), Err(SimError::DateOverflow(_))));
    }
}
