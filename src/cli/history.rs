use std::{fmt::Display, io::Write};

use anyhow::Result;
use chrono::TimeZone;

use crate::{
    storage::entities::SessionEntity,
    utils::time::{format_date, format_hours, format_time},
};

/// How many sessions `history` shows by default.
pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub date: String,
    pub time_range: String,
    pub duration: String,
}

/// The `limit` latest sessions, newest first. The log itself is in creation order, which isn't
/// necessarily chronological if the clock was adjusted.
pub fn recent_sessions(sessions: &[SessionEntity], limit: usize) -> Vec<&SessionEntity> {
    let mut sorted = sessions.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| b.tap_in.cmp(&a.tap_in));
    sorted.truncate(limit);
    sorted
}

pub fn history_entries<Tz: TimeZone>(
    sessions: &[SessionEntity],
    limit: usize,
    tz: &Tz,
) -> Vec<HistoryEntry>
where
    Tz::Offset: Display,
{
    recent_sessions(sessions, limit)
        .into_iter()
        .map(|session| {
            let tap_in = session.tap_in.with_timezone(tz);
            let tap_out = session.tap_out.with_timezone(tz);
            HistoryEntry {
                date: format_date(&tap_in),
                time_range: format!("{} - {}", format_time(&tap_in), format_time(&tap_out)),
                duration: format_hours(session.hours()),
            }
        })
        .collect()
}

pub fn print_history<Tz: TimeZone>(
    sessions: &[SessionEntity],
    limit: usize,
    tz: &Tz,
    out: &mut impl Write,
) -> Result<()>
where
    Tz::Offset: Display,
{
    if sessions.is_empty() {
        writeln!(out, "No sessions yet")?;
        return Ok(());
    }

    for entry in history_entries(sessions, limit, tz) {
        writeln!(
            out,
            "{}\t{}\t{}",
            entry.date, entry.time_range, entry.duration
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, TimeZone, Utc};

    use crate::storage::entities::SessionEntity;

    use super::*;

    fn day_session(day: u32, hours: i64) -> SessionEntity {
        let tap_in = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
        SessionEntity {
            tap_in,
            tap_out: tap_in + Duration::hours(hours) + Duration::minutes(30),
        }
    }

    #[test]
    fn test_recent_sessions_newest_first() {
        let sessions = vec![day_session(3, 1), day_session(5, 1), day_session(1, 1)];
        let recent = recent_sessions(&sessions, HISTORY_LIMIT);
        assert_eq!(recent, vec![&sessions[1], &sessions[0], &sessions[2]]);
    }

    #[test]
    fn test_recent_sessions_limited() {
        let sessions = (1..=25).map(|day| day_session(day, 1)).collect::<Vec<_>>();
        let recent = recent_sessions(&sessions, HISTORY_LIMIT);
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0], &sessions[24]);
        assert_eq!(recent[19], &sessions[5]);
    }

    #[test]
    fn test_history_entry_rendering() {
        let entries = history_entries(&[day_session(10, 8)], HISTORY_LIMIT, &Utc);
        assert_eq!(
            entries,
            vec![HistoryEntry {
                date: "Jan 10, 2024".into(),
                time_range: "09:00 AM - 05:30 PM".into(),
                duration: "8h 30m".into(),
            }]
        );
    }

    #[test]
    fn test_print_empty_history() -> Result<()> {
        let mut out = Vec::new();
        print_history(&[], HISTORY_LIMIT, &Utc, &mut out)?;
        assert_eq!(String::from_utf8(out)?, "No sessions yet\n");
        Ok(())
    }

    #[test]
    fn test_print_history_lines() -> Result<()> {
        let mut out = Vec::new();
        print_history(
            &[day_session(1, 1), day_session(2, 2)],
            HISTORY_LIMIT,
            &Utc,
            &mut out,
        )?;
        let text = String::from_utf8(out)?;
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Jan 2, 2024"));
        assert!(lines[0].ends_with("2h 30m"));
        Ok(())
    }

    #[test]
    fn test_print_history_zero_limit() -> Result<()> {
        let mut out = Vec::new();
        print_history(&[day_session(1, 1)], 0, &Utc, &mut out)?;
        assert_eq!(String::from_utf8(out)?, "");
        Ok(())
    }
}
