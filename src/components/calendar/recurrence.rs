//! Expansion of iCalendar recurrence rules (`FREQ=WEEKLY;BYDAY=MO,WE`) into occurrences.
//!
//! Calendar's scripting interface reports a recurring series as its first event plus the rule,
//! so every occurrence inside the lookahead window has to be computed here. The supported subset
//! is what Calendar writes: `FREQ`, `INTERVAL`, `COUNT`, `UNTIL`, `BYDAY` (with ordinals for
//! monthly rules) and `WKST`, which is accepted and ignored.

use crate::error::{calendar_error, AppResult};
use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday,
};
use std::str::FromStr;

/// Upper bound on periods walked for one series, which ends expansion of runaway rules
const MAX_PERIODS: u32 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A `BYDAY` entry: `MO`, or with an ordinal such as `2TU` or `-1FR`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    pub ordinal: Option<i32>,
    pub weekday: Weekday,
}

/// End of a series given as `UNTIL`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Until {
    /// `UNTIL=20261231T235959Z`
    Instant(DateTime<Utc>),
    /// `UNTIL=20261231T235959`, in the series' own time zone
    Floating(NaiveDateTime),
    /// `UNTIL=20261231`, inclusive of the whole day
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<Until>,
    pub by_day: Vec<ByDay>,
}

impl FromStr for RecurrenceRule {
    type Err = crate::error::Error;

    fn from_str(rule: &str) -> AppResult<Self> {
        let rule = rule.trim();
        let rule = rule.strip_prefix("RRULE:").unwrap_or(rule);

        let mut frequency = None;
        let mut interval = 1;
        let mut count = None;
        let mut until = None;
        let mut by_day = Vec::new();

        for part in rule.split(';').filter(|part| !part.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| invalid(rule, "expected KEY=VALUE"))?;

            match key.to_ascii_uppercase().as_str() {
                "FREQ" => {
                    frequency = Some(match value.to_ascii_uppercase().as_str() {
                        "DAILY" => Frequency::Daily,
                        "WEEKLY" => Frequency::Weekly,
                        "MONTHLY" => Frequency::Monthly,
                        "YEARLY" => Frequency::Yearly,
                        _ => return Err(invalid(rule, "unsupported FREQ")),
                    })
                }
                "INTERVAL" => {
                    interval = value
                        .parse::<u32>()
                        .ok()
                        .filter(|interval| *interval > 0)
                        .ok_or_else(|| invalid(rule, "bad INTERVAL"))?
                }
                "COUNT" => {
                    count = Some(
                        value
                            .parse::<u32>()
                            .map_err(|_| invalid(rule, "bad COUNT"))?,
                    )
                }
                "UNTIL" => {
                    until = Some(parse_until(value).ok_or_else(|| invalid(rule, "bad UNTIL"))?)
                }
                "BYDAY" => {
                    by_day = value
                        .split(',')
                        .map(|day| {
                            parse_by_day(day).ok_or_else(|| invalid(rule, "bad BYDAY"))
                        })
                        .collect::<AppResult<Vec<_>>>()?
                }
                "WKST" => {}
                _ => return Err(invalid(rule, "unsupported rule part")),
            }
        }

        Ok(Self {
            frequency: frequency.ok_or_else(|| invalid(rule, "missing FREQ"))?,
            interval,
            count,
            until,
            by_day,
        })
    }
}

impl RecurrenceRule {
    /// Starts of every occurrence of the series beginning at `first` whose span of `length`
    /// overlaps `[window_start, window_end)`. Starts matching `excluded` are left out.
    pub fn occurrences_in<Tz: TimeZone>(
        &self,
        first: &DateTime<Tz>,
        length: Duration,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        excluded: &[DateTime<Utc>],
    ) -> Vec<DateTime<Utc>> {
        let zone = first.timezone();
        let first_local = first.naive_local();
        let time = first_local.time();
        let mut emitted = 0u32;
        let mut found = Vec::new();

        for period in 0..MAX_PERIODS {
            let Some(days) = self.period_days(first_local.date(), period) else {
                break;
            };

            for day in days {
                let local = day.and_time(time);
                if local < first_local {
                    continue;
                }
                if self.past_until(&local, &zone) {
                    return found;
                }
                // Nonexistent local times (inside a DST gap) are skipped
                let Some(start) = zone.from_local_datetime(&local).earliest() else {
                    continue;
                };
                let start = start.with_timezone(&Utc);
                if start >= window_end {
                    return found;
                }

                emitted += 1;
                let overlaps = start
                    .checked_add_signed(length)
                    .map_or(true, |end| end > window_start);
                if overlaps && !excluded.contains(&start) {
                    found.push(start);
                }
                if self.count.is_some_and(|count| emitted >= count) {
                    return found;
                }
            }
        }

        found
    }

    fn past_until<Tz: TimeZone>(&self, local: &NaiveDateTime, zone: &Tz) -> bool {
        match self.until {
            None => false,
            Some(Until::Date(date)) => local.date() > date,
            Some(Until::Floating(until)) => *local > until,
            Some(Until::Instant(until)) => zone
                .from_local_datetime(local)
                .earliest()
                .is_some_and(|start| start.with_timezone(&Utc) > until),
        }
    }

    /// Candidate days of the `period`th period, in order. `None` once dates run out.
    fn period_days(&self, first: NaiveDate, period: u32) -> Option<Vec<NaiveDate>> {
        let step = period.checked_mul(self.interval)?;

        match self.frequency {
            Frequency::Daily => Some(vec![first.checked_add_days(Days::new(u64::from(step)))?]),
            Frequency::Weekly => {
                let monday = u64::from(first.weekday().num_days_from_monday());
                let week_start = first
                    .checked_sub_days(Days::new(monday))?
                    .checked_add_days(Days::new(u64::from(step) * 7))?;
                let mut weekdays: Vec<Weekday> = if self.by_day.is_empty() {
                    vec![first.weekday()]
                } else {
                    self.by_day.iter().map(|entry| entry.weekday).collect()
                };
                weekdays.sort_by_key(|weekday| weekday.num_days_from_monday());
                weekdays.dedup();

                weekdays
                    .into_iter()
                    .map(|weekday| {
                        let offset = u64::from(weekday.num_days_from_monday());
                        week_start.checked_add_days(Days::new(offset))
                    })
                    .collect()
            }
            Frequency::Monthly => {
                let month_start = first
                    .with_day(1)?
                    .checked_add_months(Months::new(step))?;
                if self.by_day.is_empty() {
                    return Some(month_start.with_day(first.day()).into_iter().collect());
                }

                let mut days: Vec<NaiveDate> = self
                    .by_day
                    .iter()
                    .flat_map(|entry| weekdays_in_month(month_start, *entry))
                    .collect();
                days.sort();
                days.dedup();
                Some(days)
            }
            Frequency::Yearly => {
                let year = first.year().checked_add(i32::try_from(step).ok()?)?;
                if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
                    return None;
                }
                // Feb 29 series skip non-leap years
                Some(
                    NaiveDate::from_ymd_opt(year, first.month(), first.day())
                        .into_iter()
                        .collect(),
                )
            }
        }
    }
}

/// Days of the month starting at `month_start` matching `entry`
fn weekdays_in_month(month_start: NaiveDate, entry: ByDay) -> Vec<NaiveDate> {
    let all: Vec<NaiveDate> = month_start
        .iter_days()
        .take_while(|day| day.month() == month_start.month())
        .filter(|day| day.weekday() == entry.weekday)
        .collect();

    match entry.ordinal {
        None => all,
        Some(n) if n > 0 => all.get(n as usize - 1).copied().into_iter().collect(),
        Some(n) if n < 0 => all
            .len()
            .checked_sub(n.unsigned_abs() as usize)
            .and_then(|index| all.get(index).copied())
            .into_iter()
            .collect(),
        Some(_) => Vec::new(),
    }
}

fn parse_by_day(day: &str) -> Option<ByDay> {
    let day = day.trim();
    let split = day.len().checked_sub(2)?;
    let (ordinal, weekday) = (day.get(..split)?, day.get(split..)?);

    let weekday = match weekday.to_ascii_uppercase().as_str() {
        "MO" => Weekday::Mon,
        "TU" => Weekday::Tue,
        "WE" => Weekday::Wed,
        "TH" => Weekday::Thu,
        "FR" => Weekday::Fri,
        "SA" => Weekday::Sat,
        "SU" => Weekday::Sun,
        _ => return None,
    };
    let ordinal = match ordinal {
        "" => None,
        ordinal => Some(ordinal.trim_start_matches('+').parse::<i32>().ok()?),
    };

    Some(ByDay { ordinal, weekday })
}

fn parse_until(value: &str) -> Option<Until> {
    let value = value.trim();
    if let Some(instant) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(instant, "%Y%m%dT%H%M%S").ok()?;
        return Some(Until::Instant(naive.and_utc()));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S") {
        return Some(Until::Floating(naive));
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .ok()
        .map(Until::Date)
}

fn invalid(rule: &str, reason: &str) -> crate::error::Error {
    calendar_error(&format!("Unsupported recurrence rule {:?}: {}", rule, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Helsinki;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn rule(text: &str) -> RecurrenceRule {
        text.parse().unwrap()
    }

    #[test]
    fn test_parse_rules() {
        let weekly = rule("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;WKST=MO");
        assert_eq!(weekly.frequency, Frequency::Weekly);
        assert_eq!(weekly.interval, 2);
        assert_eq!(weekly.by_day.len(), 2);

        let monthly = rule("RRULE:FREQ=MONTHLY;BYDAY=-1FR;COUNT=3");
        assert_eq!(
            monthly.by_day,
            vec![ByDay {
                ordinal: Some(-1),
                weekday: Weekday::Fri
            }]
        );
        assert_eq!(monthly.count, Some(3));

        assert_eq!(
            rule("FREQ=DAILY;UNTIL=20261020T000000Z").until,
            Some(Until::Instant(utc(2026, 10, 20, 0, 0)))
        );
        assert_eq!(
            rule("FREQ=DAILY;UNTIL=20261020").until,
            Some(Until::Date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()))
        );

        assert!("INTERVAL=2".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=HOURLY".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=WEEKLY;BYDAY=XX".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=DAILY;INTERVAL=0".parse::<RecurrenceRule>().is_err());
    }

    #[test]
    fn test_weekly_series_started_months_ago() {
        // Monday standups since January, window Thu 15 Oct to Tue 20 Oct
        let first = utc(2026, 1, 5, 9, 0);
        let starts = rule("FREQ=WEEKLY").occurrences_in(
            &first,
            Duration::minutes(15),
            utc(2026, 10, 15, 9, 0),
            utc(2026, 10, 20, 9, 0),
            &[],
        );
        assert_eq!(starts, vec![utc(2026, 10, 19, 9, 0)]);
    }

    #[test]
    fn test_weekly_by_day_and_interval() {
        let first = utc(2026, 10, 5, 12, 0); // Monday
        let starts = rule("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR").occurrences_in(
            &first,
            Duration::hours(1),
            utc(2026, 10, 1, 0, 0),
            utc(2026, 10, 31, 0, 0),
            &[],
        );
        assert_eq!(
            starts,
            vec![
                utc(2026, 10, 5, 12, 0),
                utc(2026, 10, 9, 12, 0),
                utc(2026, 10, 19, 12, 0),
                utc(2026, 10, 23, 12, 0),
            ]
        );
    }

    #[test]
    fn test_ongoing_occurrence_overlaps_window() {
        let first = utc(2026, 10, 1, 8, 30);
        let starts = rule("FREQ=DAILY").occurrences_in(
            &first,
            Duration::hours(1),
            utc(2026, 10, 15, 9, 0),
            utc(2026, 10, 16, 9, 0),
            &[],
        );
        assert_eq!(starts, vec![utc(2026, 10, 15, 8, 30), utc(2026, 10, 16, 8, 30)]);
    }

    #[test]
    fn test_count_until_and_exclusions() {
        let first = utc(2026, 10, 12, 9, 0);
        let window = (utc(2026, 10, 1, 0, 0), utc(2026, 11, 1, 0, 0));

        let counted = rule("FREQ=DAILY;COUNT=3").occurrences_in(
            &first,
            Duration::hours(1),
            window.0,
            window.1,
            &[],
        );
        assert_eq!(counted.len(), 3);

        let until = rule("FREQ=DAILY;UNTIL=20261014").occurrences_in(
            &first,
            Duration::hours(1),
            window.0,
            window.1,
            &[],
        );
        assert_eq!(until.last(), Some(&utc(2026, 10, 14, 9, 0)));

        // An excluded occurrence still counts towards COUNT
        let excluded = rule("FREQ=DAILY;COUNT=3").occurrences_in(
            &first,
            Duration::hours(1),
            window.0,
            window.1,
            &[utc(2026, 10, 13, 9, 0)],
        );
        assert_eq!(excluded, vec![utc(2026, 10, 12, 9, 0), utc(2026, 10, 14, 9, 0)]);
    }

    #[test]
    fn test_monthly_rules() {
        let window = (utc(2026, 1, 1, 0, 0), utc(2026, 6, 1, 0, 0));

        // The 31st only exists in some months
        let by_date = rule("FREQ=MONTHLY").occurrences_in(
            &utc(2026, 1, 31, 10, 0),
            Duration::hours(1),
            window.0,
            window.1,
            &[],
        );
        assert_eq!(
            by_date,
            vec![
                utc(2026, 1, 31, 10, 0),
                utc(2026, 3, 31, 10, 0),
                utc(2026, 5, 31, 10, 0)
            ]
        );

        let last_friday = rule("FREQ=MONTHLY;BYDAY=-1FR").occurrences_in(
            &utc(2026, 1, 30, 15, 0),
            Duration::hours(1),
            window.0,
            utc(2026, 4, 1, 0, 0),
            &[],
        );
        assert_eq!(
            last_friday,
            vec![
                utc(2026, 1, 30, 15, 0),
                utc(2026, 2, 27, 15, 0),
                utc(2026, 3, 27, 15, 0)
            ]
        );
    }

    #[test]
    fn test_yearly_birthday() {
        let starts = rule("FREQ=YEARLY").occurrences_in(
            &utc(2001, 10, 16, 0, 0),
            Duration::days(1),
            utc(2026, 10, 15, 9, 0),
            utc(2026, 10, 17, 9, 0),
            &[],
        );
        assert_eq!(starts, vec![utc(2026, 10, 16, 0, 0)]);
    }

    #[test]
    fn test_local_time_kept_across_dst() {
        // 09:00 in Helsinki is 06:00 UTC in summer and 07:00 UTC in winter
        let first = Helsinki.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let starts = rule("FREQ=WEEKLY").occurrences_in(
            &first,
            Duration::minutes(30),
            utc(2026, 10, 1, 0, 0),
            utc(2026, 11, 3, 0, 0),
            &[],
        );
        assert_eq!(
            starts,
            vec![
                utc(2026, 10, 19, 6, 0),
                utc(2026, 10, 26, 7, 0),
                utc(2026, 11, 2, 7, 0)
            ]
        );
    }
}
