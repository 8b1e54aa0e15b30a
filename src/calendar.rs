use chrono::NaiveDate;

use crate::dates::{enumerate_month, shift_month, week_of, Clock};

pub fn goto_previous_month(cursor: NaiveDate) -> NaiveDate {
    shift_month(cursor, -1)
}

pub fn goto_next_month(cursor: NaiveDate) -> NaiveDate {
    shift_month(cursor, 1)
}

pub fn goto_today(clock: &impl Clock) -> NaiveDate {
    clock.today()
}

pub fn goto_date(date: NaiveDate) -> NaiveDate {
    date
}

/// The month cursor. Day lists are derived on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    cursor: NaiveDate,
}

impl CalendarState {
    pub fn new(cursor: NaiveDate) -> Self {
        Self { cursor }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn previous_month(&mut self) {
        self.cursor = goto_previous_month(self.cursor);
    }

    pub fn next_month(&mut self) {
        self.cursor = goto_next_month(self.cursor);
    }

    pub fn today(&mut self, clock: &impl Clock) {
        self.cursor = goto_today(clock);
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.cursor = goto_date(date);
    }

    pub fn days_in_month(&self) -> Vec<NaiveDate> {
        enumerate_month(self.cursor)
    }

    pub fn week_header(&self) -> [NaiveDate; 7] {
        week_of(self.cursor)
    }
}
