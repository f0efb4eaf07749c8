use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::{
    storage::entities::{OpenSessionEntity, SessionEntity},
    utils::percentage::{progress_percentage, Percentage},
};

/// Hours a month is expected to add up to.
pub const MONTHLY_TARGET: f64 = 200.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub today_hours: f64,
    pub month_hours: f64,
    pub remaining_hours: f64,
    pub progress: Percentage,
}

/// Sessions that started on `date` as seen from `tz`.
pub fn sessions_on<'a, Tz: TimeZone>(
    sessions: &'a [SessionEntity],
    date: NaiveDate,
    tz: &Tz,
) -> Vec<&'a SessionEntity> {
    sessions
        .iter()
        .filter(|v| v.tap_in.with_timezone(tz).date_naive() == date)
        .collect()
}

/// Sessions that started during `month` (1 based) of `year` as seen from `tz`.
pub fn sessions_in_month<'a, Tz: TimeZone>(
    sessions: &'a [SessionEntity],
    year: i32,
    month: u32,
    tz: &Tz,
) -> Vec<&'a SessionEntity> {
    sessions
        .iter()
        .filter(|v| {
            let tap_in = v.tap_in.with_timezone(tz);
            tap_in.year() == year && tap_in.month() == month
        })
        .collect()
}

pub fn total_hours<'a>(sessions: impl IntoIterator<Item = &'a SessionEntity>) -> f64 {
    sessions.into_iter().map(SessionEntity::hours).sum()
}

/// Today and this month are taken from `now`, including its timezone. The open session counts
/// fully towards both, even if it started yesterday.
pub fn compute_stats<Tz: TimeZone>(
    sessions: &[SessionEntity],
    open: Option<&OpenSessionEntity>,
    now: &DateTime<Tz>,
) -> Stats {
    let tz = now.timezone();
    let open_hours = open.map_or(0., |v| v.elapsed_hours(&now.with_timezone(&Utc)));

    let today_hours = total_hours(sessions_on(sessions, now.date_naive(), &tz)) + open_hours;
    let month_hours =
        total_hours(sessions_in_month(sessions, now.year(), now.month(), &tz)) + open_hours;

    Stats {
        today_hours,
        month_hours,
        remaining_hours: (MONTHLY_TARGET - month_hours).max(0.),
        progress: progress_percentage(month_hours, MONTHLY_TARGET),
    }
}
