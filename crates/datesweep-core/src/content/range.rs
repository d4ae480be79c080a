use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::DATETIME_FORMAT;

/// An inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `start` at 00:00:00
    pub fn first_moment(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// `end` at 23:59:59
    pub fn last_moment(&self) -> NaiveDateTime {
        self.end
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| self.end.and_time(NaiveTime::MIN))
    }

    /// Lower bound in stored timestamp form
    pub fn lower_bound(&self) -> String {
        self.first_moment().format(DATETIME_FORMAT).to_string()
    }

    /// Upper bound in stored timestamp form
    pub fn upper_bound(&self) -> String {
        self.last_moment().format(DATETIME_FORMAT).to_string()
    }

    pub fn contains(&self, moment: NaiveDateTime) -> bool {
        moment >= self.first_moment() && moment <= self.last_moment()
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}
