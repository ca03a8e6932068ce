//! Daily highs and lows derived from hourly intervals.

use chrono::{DateTime, Datelike, Duration, TimeZone};

use crate::{DailyExtreme, Interval, Timeline};

const SECONDS_PER_DAY: i64 = 86_400;

/// How an hourly interval is attributed to a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayMatch {
    /// Compare only the day-of-month of the interval start with the target
    /// day. Hours from another month with the same day number are counted too.
    #[default]
    DayOfMonth,
    /// Compare full calendar dates, with the interval start converted to the
    /// target's timezone.
    CalendarDate,
}

/// One [`DailyExtreme`] per day offset in `0..days`, starting at `now`'s day.
///
/// Day `i` is the calendar day of `now + i * 86400s` in `now`'s timezone.
/// Intervals are matched by day-of-month of their upstream start time.
/// Temperatures are rounded half away from zero before taking the extremes;
/// a day without intervals yields `{ high: 0, low: 0 }`.
pub fn daily_extremes<Tz: TimeZone>(
    hourly: &[Interval],
    days: usize,
    now: &DateTime<Tz>,
) -> Vec<DailyExtreme> {
    daily_extremes_with(hourly, days, now, DayMatch::DayOfMonth)
}

/// Like [`daily_extremes`], attributing intervals by full calendar date.
pub fn daily_extremes_by_date<Tz: TimeZone>(
    hourly: &[Interval],
    days: usize,
    now: &DateTime<Tz>,
) -> Vec<DailyExtreme> {
    daily_extremes_with(hourly, days, now, DayMatch::CalendarDate)
}

pub fn daily_extremes_with<Tz: TimeZone>(
    hourly: &[Interval],
    days: usize,
    now: &DateTime<Tz>,
    rule: DayMatch,
) -> Vec<DailyExtreme> {
    (0..days)
        .map(|i| {
            let target = now.clone() + Duration::seconds(SECONDS_PER_DAY * i as i64);
            let rounded = hourly
                .iter()
                .filter(|interval| matches_day(interval, &target, rule))
                .map(|interval| interval.values.temperature.round() as i32);
            extreme(rounded)
        })
        .collect()
}

fn matches_day<Tz: TimeZone>(
    interval: &Interval,
    target: &DateTime<Tz>,
    rule: DayMatch,
) -> bool {
    match rule {
        DayMatch::DayOfMonth => interval.start_time.day() == target.day(),
        DayMatch::CalendarDate => {
            let local = interval.start_time.with_timezone(&target.timezone());
            local.date_naive() == target.date_naive()
        }
    }
}

fn extreme(temps: impl Iterator<Item = i32>) -> DailyExtreme {
    let mut result: Option<DailyExtreme> = None;
    for t in temps {
        let e = result.get_or_insert(DailyExtreme { high: t, low: t });
        e.high = e.high.max(t);
        e.low = e.low.min(t);
    }
    result.unwrap_or_default()
}

impl Timeline {
    /// [`daily_extremes`] over this timeline's intervals.
    pub fn daily_extremes<Tz: TimeZone>(
        &self,
        days: usize,
        now: &DateTime<Tz>,
    ) -> Vec<DailyExtreme> {
        daily_extremes(&self.intervals, days, now)
    }
}
