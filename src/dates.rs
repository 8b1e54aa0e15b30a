use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Source of the current calendar day.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Every day of the month containing `cursor`, first to last.
pub fn enumerate_month(cursor: NaiveDate) -> Vec<NaiveDate> {
    std::iter::successors(Some(first_day_of_month(cursor)), |day| day.succ_opt())
        .take_while(|day| day.month() == cursor.month())
        .collect()
}

/// The Monday-start week containing `cursor`. At the ends of the
/// representable range, where that week is cut short, the nearest complete
/// Monday-start week is returned instead.
pub fn week_of(cursor: NaiveDate) -> [NaiveDate; 7] {
    let mut monday = start_of_week(cursor);
    if monday.checked_add_signed(Duration::days(6)).is_none() {
        monday = NaiveDate::MAX
            .checked_sub_signed(Duration::days(6))
            .map(start_of_week)
            .unwrap_or(monday);
    }
    std::array::from_fn(|offset| {
        monday
            .checked_add_signed(Duration::days(offset as i64))
            .unwrap_or(NaiveDate::MAX)
    })
}

/// Formats any calendar value as `YYYY-MM-DD`. Time-of-day is ignored, so a
/// local timestamp and the naive date of the same day share a key.
pub fn date_key<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT).ok()
}

pub fn is_same_calendar_day<A: Datelike, B: Datelike>(left: &A, right: &B) -> bool {
    left.year() == right.year() && left.ordinal() == right.ordinal()
}

pub fn is_today<D: Datelike>(date: &D, clock: &impl Clock) -> bool {
    is_same_calendar_day(date, &clock.today())
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => first,
        None => return 0,
    };
    match first.checked_add_months(Months::new(1)) {
        Some(first_of_next) => (first_of_next - first).num_days() as u32,
        None => 31,
    }
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// The Monday on or before `day`, or the first Monday of the range when
/// that would underflow.
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    let days_from_monday = day.weekday().num_days_from_monday() as i64;
    match day.checked_sub_signed(Duration::days(days_from_monday)) {
        Some(monday) => monday,
        None => NaiveDate::MIN
            .iter_days()
            .find(|candidate| candidate.weekday() == Weekday::Mon)
            .unwrap_or(NaiveDate::MIN),
    }
}

/// Moves `day` by whole months, clamping the day-of-month to the target
/// month's length. Saturates at the representable range.
pub fn shift_month(day: NaiveDate, delta: i32) -> NaiveDate {
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        day.checked_add_months(months)
    } else {
        day.checked_sub_months(months)
    };
    shifted.unwrap_or(day)
}

pub fn month_title(day: NaiveDate) -> String {
    day.format("%B %Y").to_string()
}

pub fn day_heading(day: NaiveDate) -> String {
    format!(
        "{} {}{}, {}",
        day.format("%B"),
        day.day(),
        ordinal_suffix(day.day()),
        day.year()
    )
}

pub fn weekday_label(day: NaiveDate) -> String {
    day.format("%a").to_string()
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Local, NaiveDate, TimeZone, Weekday};

    use super::{
        date_key, day_heading, days_in_month, enumerate_month, is_same_calendar_day, is_today,
        month_title, parse_date_key, shift_month, week_of, FixedClock,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn enumerates_every_month_length() {
        assert_eq!(enumerate_month(date(2024, 2, 10)).len(), 29);
        assert_eq!(enumerate_month(date(2023, 2, 10)).len(), 28);
        assert_eq!(enumerate_month(date(2026, 4, 30)).len(), 30);
        assert_eq!(enumerate_month(date(2026, 12, 31)).len(), 31);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);

        let january = enumerate_month(date(2026, 1, 17));
        assert_eq!(january.len(), 31);
        assert_eq!(january.first(), Some(&date(2026, 1, 1)));
        assert_eq!(january.last(), Some(&date(2026, 1, 31)));
        assert!(january.windows(2).all(|pair| pair[1] == pair[0].succ_opt().unwrap()));
    }

    #[test]
    fn week_always_starts_on_monday() {
        for day in date(2024, 1, 1).iter_days().take(366) {
            let week = week_of(day);
            assert_eq!(week[0].weekday(), Weekday::Mon);
            assert_eq!(week[6].weekday(), Weekday::Sun);
            assert!(week.contains(&day));
        }
        // Sunday belongs to the week that began six days earlier.
        assert_eq!(week_of(date(2026, 10, 18))[0], date(2026, 10, 12));
        assert_eq!(week_of(date(2026, 10, 19))[0], date(2026, 10, 19));
    }

    #[test]
    fn week_at_range_ends_stays_whole() {
        for cursor in [NaiveDate::MAX, NaiveDate::MIN] {
            let week = week_of(cursor);
            assert_eq!(week[0].weekday(), Weekday::Mon);
            assert!(week.windows(2).all(|pair| pair[0].succ_opt() == Some(pair[1])));
        }
        assert!(week_of(NaiveDate::MAX)[6] <= NaiveDate::MAX);
        assert!(week_of(NaiveDate::MIN)[0] >= NaiveDate::MIN);
    }

    #[test]
    fn date_key_ignores_time_of_day() {
        let day = date(2024, 3, 5);
        let morning = Local.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        let evening = Local.with_ymd_and_hms(2024, 3, 5, 23, 45, 0).unwrap();

        assert_eq!(date_key(&day), "2024-03-05");
        assert_eq!(date_key(&morning), date_key(&evening));
        assert_eq!(date_key(&morning), date_key(&day));
        assert!(is_same_calendar_day(&morning, &day));
        assert!(!is_same_calendar_day(&morning, &date(2025, 3, 5)));

        let key = date_key(&date(1987, 11, 20));
        assert_eq!(key.len(), 10);
        assert!(key.chars().enumerate().all(|(index, ch)| match index {
            4 | 7 => ch == '-',
            _ => ch.is_ascii_digit(),
        }));
        assert_eq!(parse_date_key(&key), Some(date(1987, 11, 20)));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert_eq!(parse_date_key("2024-02-30"), None);
        assert_eq!(parse_date_key("2024-2-3"), None);
        assert_eq!(parse_date_key("yesterday"), None);
    }

    #[test]
    fn today_follows_the_clock() {
        let clock = FixedClock(date(2026, 10, 19));
        assert!(is_today(&date(2026, 10, 19), &clock));
        assert!(!is_today(&date(2026, 10, 20), &clock));
    }

    #[test]
    fn month_shift_clamps_day() {
        assert_eq!(shift_month(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(shift_month(date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(shift_month(date(2024, 12, 15), 1), date(2025, 1, 15));
        assert_eq!(shift_month(date(2024, 1, 15), -13), date(2022, 12, 15));
        assert_eq!(shift_month(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn formats_headings() {
        assert_eq!(month_title(date(2026, 10, 19)), "October 2026");
        assert_eq!(day_heading(date(2026, 10, 1)), "October 1st, 2026");
        assert_eq!(day_heading(date(2026, 10, 12)), "October 12th, 2026");
        assert_eq!(day_heading(date(2026, 10, 22)), "October 22nd, 2026");
        assert_eq!(day_heading(date(2026, 10, 23)), "October 23rd, 2026");
    }
}
