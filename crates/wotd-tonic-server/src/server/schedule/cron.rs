//! Five-field cron expressions: `minute hour day-of-month month day-of-week`.
//!
//! Each field accepts `*` (or `?`), a value, an `a-b` range, a `,` separated
//! list of those, and a `/step` suffix on `*`, a range or a single value (in
//! which case the range runs to the field maximum). Months accept `JAN`-`DEC`
//! and days of the week `SUN`-`SAT`, case-insensitively. Day of week 0 is
//! Sunday.
//!
//! When both day fields are restricted, a day matches if either one does.
//! When at least one of them is unrestricted, both must match.

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Timelike,
};
use core::{fmt, str::FromStr};

/// How far ahead [`CronSchedule::next_after`] searches before giving up.
const SEARCH_YEARS: i32 = 5;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CronError {
    #[error("expected 5 fields (minute hour day-of-month month day-of-week), found {0}")]
    FieldCount(usize),

    #[error("invalid {field} value `{value}`")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} value {value} is outside {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid {field} step `{value}`")]
    InvalidStep { field: &'static str, value: String },

    #[error("{field} range {start}-{end} runs backwards")]
    ReversedRange {
        field: &'static str,
        start: u32,
        end: u32,
    },
}

struct Field {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
}

const MINUTE: Field = Field {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
};
const HOUR: Field = Field {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
};
const DAY_OF_MONTH: Field = Field {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: &[],
};
const MONTH: Field = Field {
    name: "month",
    min: 1,
    max: 12,
    names: &[
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ],
};
const DAY_OF_WEEK: Field = Field {
    name: "day-of-week",
    min: 0,
    max: 6,
    names: &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"],
};

/// Bit set of allowed values for one field, plus whether it was written as an
/// unrestricted `*`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Bits {
    mask: u64,
    any: bool,
}

impl Bits {
    fn contains(self, value: u32) -> bool {
        self.mask & (1 << value) != 0
    }
}

impl Field {
    fn parse(&self, expr: &str) -> Result<Bits, CronError> {
        let mut bits = Bits {
            mask: 0,
            any: false,
        };
        for part in expr.split(',') {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => (range, Some(self.step(step)?)),
                None => (part, None),
            };

            let (start, end, star) = if range == "*" || range == "?" {
                (self.min, self.max, true)
            } else if let Some((start, end)) = range.split_once('-') {
                (self.value(start)?, self.value(end)?, false)
            } else {
                let value = self.value(range)?;
                (value, if step.is_some() { self.max } else { value }, false)
            };

            if start > end {
                return Err(CronError::ReversedRange {
                    field: self.name,
                    start,
                    end,
                });
            }

            let step = step.unwrap_or(1);
            for value in (start..=end).step_by(step as usize) {
                bits.mask |= 1 << value;
            }
            bits.any |= star && step == 1;
        }
        Ok(bits)
    }

    fn value(&self, raw: &str) -> Result<u32, CronError> {
        if let Some(idx) = self
            .names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(raw))
        {
            return Ok(self.min + idx as u32);
        }

        let value: u32 = raw.parse().map_err(|_| CronError::InvalidValue {
            field: self.name,
            value: raw.to_string(),
        })?;
        if value < self.min || value > self.max {
            return Err(CronError::OutOfRange {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }

    fn step(&self, raw: &str) -> Result<u32, CronError> {
        match raw.parse::<u32>() {
            Ok(step) if step > 0 => Ok(step),
            _ => Err(CronError::InvalidStep {
                field: self.name,
                value: raw.to_string(),
            }),
        }
    }
}

/// A parsed cron schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CronSchedule {
    source: String,
    minutes: Bits,
    hours: Bits,
    days_of_month: Bits,
    months: Bits,
    days_of_week: Bits,
}

impl CronSchedule {
    /// Returns the first minute strictly after `after` that matches this
    /// schedule, evaluated in `after`'s timezone.
    ///
    /// Local times skipped by a DST transition are never returned; ambiguous
    /// ones resolve to the earlier instant. Returns `None` if nothing matches
    /// within five years (e.g. `0 0 30 2 *`).
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let mut t = after
            .naive_local()
            .with_second(0)?
            .with_nanosecond(0)?
            .checked_add_signed(TimeDelta::minutes(1))?;
        let last_year = t.year() + SEARCH_YEARS;

        while t.year() <= last_year {
            if !self.months.contains(t.month()) {
                t = first_of_next_month(t)?;
                continue;
            }
            if !self.day_matches(t.date()) {
                t = t.date().succ_opt()?.and_time(NaiveTime::MIN);
                continue;
            }
            if !self.hours.contains(t.hour()) {
                t = t.date().and_hms_opt(t.hour(), 0, 0)? + TimeDelta::hours(1);
                continue;
            }
            if !self.minutes.contains(t.minute()) {
                t += TimeDelta::minutes(1);
                continue;
            }

            match tz.from_local_datetime(&t) {
                LocalResult::Single(dt) => return Some(dt),
                LocalResult::Ambiguous(earliest, _) => return Some(earliest),
                LocalResult::None => t += TimeDelta::minutes(1),
            }
        }
        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.days_of_month.contains(date.day());
        let dow = self
            .days_of_week
            .contains(date.weekday().num_days_from_sunday());
        if self.days_of_month.any || self.days_of_week.any {
            dom && dow
        } else {
            dom || dow
        }
    }
}

fn first_of_next_month(t: NaiveDateTime) -> Option<NaiveDateTime> {
    let (year, month) = if t.month() == 12 {
        (t.year() + 1, 1)
    } else {
        (t.year(), t.month() + 1)
    };
    Some(NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN))
}

impl FromStr for CronSchedule {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let &[minute, hour, dom, month, dow] = fields.as_slice() else {
            return Err(CronError::FieldCount(fields.len()));
        };

        Ok(Self {
            source: fields.join(" "),
            minutes: MINUTE.parse(minute)?,
            hours: HOUR.parse(hour)?,
            days_of_month: DAY_OF_MONTH.parse(dom)?,
            months: MONTH.parse(month)?,
            days_of_week: DAY_OF_WEEK.parse(dow)?,
        })
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn next(expr: &str, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        expr.parse::<CronSchedule>().unwrap().next_after(&after)
    }

    #[test]
    fn every_minute_is_strictly_after() {
        let after = Utc.with_ymd_and_hms(2026, 10, 17, 10, 7, 30).unwrap();
        assert_eq!(next("* * * * *", after), Some(at(2026, 10, 17, 10, 8)));
        assert_eq!(next("* * * * *", at(2026, 10, 17, 10, 7)), Some(at(2026, 10, 17, 10, 8)));
    }

    #[test]
    fn steps_and_ranges() {
        assert_eq!(next("*/15 * * * *", at(2026, 10, 17, 10, 7)), Some(at(2026, 10, 17, 10, 15)));
        assert_eq!(next("*/15 * * * *", at(2026, 10, 17, 10, 45)), Some(at(2026, 10, 17, 11, 0)));
        assert_eq!(next("10-20/5 * * * *", at(2026, 10, 17, 10, 16)), Some(at(2026, 10, 17, 10, 20)));
        assert_eq!(next("50/5 * * * *", at(2026, 10, 17, 10, 51)), Some(at(2026, 10, 17, 10, 55)));
        assert_eq!(next("0 8,20 * * *", at(2026, 10, 17, 9, 0)), Some(at(2026, 10, 17, 20, 0)));
    }

    #[test]
    fn daily_at_nine_rolls_over_month_and_year() {
        assert_eq!(next("0 9 * * *", at(2026, 12, 31, 9, 0)), Some(at(2027, 1, 1, 9, 0)));
        assert_eq!(next("0 9 * * *", at(2026, 4, 30, 10, 0)), Some(at(2026, 5, 1, 9, 0)));
    }

    #[test]
    fn named_weekdays() {
        // 2026-10-17 is a Saturday.
        assert_eq!(next("0 9 * * MON-FRI", at(2026, 10, 17, 8, 0)), Some(at(2026, 10, 19, 9, 0)));
        assert_eq!(next("0 9 * * sun", at(2026, 10, 17, 8, 0)), Some(at(2026, 10, 18, 9, 0)));
    }

    #[test]
    fn named_months() {
        assert_eq!(next("0 0 1 JAN *", at(2026, 3, 5, 0, 0)), Some(at(2027, 1, 1, 0, 0)));
    }

    #[test]
    fn restricted_day_fields_match_either() {
        // The 13th or any Friday; 2026-10-23 is the first Friday after the 17th.
        assert_eq!(next("0 0 13 * FRI", at(2026, 10, 17, 0, 0)), Some(at(2026, 10, 23, 0, 0)));
        // With day-of-month unrestricted, only Fridays match.
        assert_eq!(next("0 0 * * FRI", at(2026, 10, 17, 0, 0)), Some(at(2026, 10, 23, 0, 0)));
        // With day-of-week unrestricted, only the 13th matches.
        assert_eq!(next("0 0 13 * *", at(2026, 10, 17, 0, 0)), Some(at(2026, 11, 13, 0, 0)));
    }

    #[test]
    fn leap_day() {
        assert_eq!(next("0 0 29 2 *", at(2026, 3, 1, 0, 0)), Some(at(2028, 2, 29, 0, 0)));
    }

    #[test]
    fn impossible_schedule_gives_up() {
        assert_eq!(next("0 0 30 2 *", at(2026, 1, 1, 0, 0)), None);
    }

    #[test]
    fn display_normalises_whitespace() {
        let schedule: CronSchedule = "  0   9 * *   MON ".parse().unwrap();
        assert_eq!(schedule.to_string(), "0 9 * * MON");
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert_eq!("* * * *".parse::<CronSchedule>(), Err(CronError::FieldCount(4)));
        assert_eq!("0 * * * * *".parse::<CronSchedule>(), Err(CronError::FieldCount(6)));
        assert_eq!("".parse::<CronSchedule>(), Err(CronError::FieldCount(0)));
        assert!(matches!(
            "60 * * * *".parse::<CronSchedule>(),
            Err(CronError::OutOfRange { field: "minute", value: 60, .. })
        ));
        assert!(matches!(
            "* * 0 * *".parse::<CronSchedule>(),
            Err(CronError::OutOfRange { field: "day-of-month", .. })
        ));
        assert!(matches!(
            "* * * * 7".parse::<CronSchedule>(),
            Err(CronError::OutOfRange { field: "day-of-week", .. })
        ));
        assert!(matches!(
            "a * * * *".parse::<CronSchedule>(),
            Err(CronError::InvalidValue { field: "minute", .. })
        ));
        assert!(matches!(
            "*/0 * * * *".parse::<CronSchedule>(),
            Err(CronError::InvalidStep { .. })
        ));
        assert!(matches!(
            "* 5-1 * * *".parse::<CronSchedule>(),
            Err(CronError::ReversedRange { field: "hour", start: 5, end: 1 })
        ));
        assert!(matches!(
            "1,,2 * * * *".parse::<CronSchedule>(),
            Err(CronError::InvalidValue { .. })
        ));
        assert!(matches!(
            "@daily".parse::<CronSchedule>(),
            Err(CronError::FieldCount(1))
        ));
    }
}
