use std::{fmt::Display, io::Write};

use ansi_term::Colour;
use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};

use crate::{
    storage::entities::SessionState,
    tracker::{stats::compute_stats, TapOutcome},
    utils::{
        percentage::Percentage,
        time::{format_fixed_hours, format_hours, format_time},
    },
};

const PROGRESS_BAR_WIDTH: usize = 20;

/// Prints the status panel: whether the user is tapped in, today's and this month's hours and
/// the progress towards the monthly target. `now` decides both the elapsed time and which day and
/// month the totals are for.
pub fn print_status<Tz: TimeZone>(
    state: &SessionState,
    now: &DateTime<Tz>,
    out: &mut impl Write,
) -> Result<()>
where
    Tz::Offset: Display,
{
    let tz = now.timezone();
    match &state.open {
        Some(open) => {
            writeln!(out, "{}", Colour::Green.bold().paint("Tapped In"))?;
            writeln!(
                out,
                "Since {} ({})",
                format_time(&open.tap_in.with_timezone(&tz)),
                format_hours(open.elapsed_hours(&now.with_timezone(&Utc)))
            )?;
        }
        None => writeln!(out, "{}", Colour::White.dimmed().paint("Not Tapped In"))?,
    }

    let stats = compute_stats(&state.sessions, state.open.as_ref(), now);
    writeln!(out)?;
    writeln!(out, "Today\t\t{}h", format_fixed_hours(stats.today_hours))?;
    writeln!(out, "This month\t{}h", format_fixed_hours(stats.month_hours))?;
    writeln!(out, "Remaining\t{}h", format_fixed_hours(stats.remaining_hours))?;
    writeln!(
        out,
        "Progress\t{} {}",
        stats.progress,
        progress_bar(stats.progress)
    )?;
    Ok(())
}

fn progress_bar(progress: Percentage) -> String {
    let filled = ((*progress / 100.) * PROGRESS_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// One line telling the user what a tap did.
pub fn describe_outcome<Tz: TimeZone>(outcome: &TapOutcome, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    match outcome {
        TapOutcome::TappedIn(open) => {
            format!("Tapped in at {}", format_time(&open.tap_in.with_timezone(tz)))
        }
        TapOutcome::TappedOut(session) => format!(
            "Tapped out at {} after {}",
            format_time(&session.tap_out.with_timezone(tz)),
            format_hours(session.hours())
        ),
        TapOutcome::AlreadyTappedIn(open) => format!(
            "Already tapped in since {}",
            format_time(&open.tap_in.with_timezone(tz))
        ),
        TapOutcome::NotTappedIn => "Not tapped in, nothing to tap out of".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, TimeZone, Utc};

    use crate::{
        storage::entities::{OpenSessionEntity, SessionEntity, SessionState},
        tracker::TapOutcome,
        utils::percentage::{progress_percentage, Percentage},
    };

    use super::{describe_outcome, print_status, progress_bar};

    fn render(state: &SessionState, now: chrono::DateTime<Utc>) -> Result<String> {
        let mut out = Vec::new();
        print_status(state, &now, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_status_not_tapped_in() -> Result<()> {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let text = render(&SessionState::default(), now)?;

        assert!(text.contains("Not Tapped In"));
        assert!(!text.contains("Since"));
        assert!(text.contains("Today\t\t0.00h"));
        assert!(text.contains("Remaining\t200.00h"));
        assert!(text.contains("Progress\t0% [....................]"));
        Ok(())
    }

    #[test]
    fn test_status_tapped_in() -> Result<()> {
        let tap_in = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let state = SessionState {
            sessions: vec![SessionEntity {
                tap_in: tap_in - Duration::days(1),
                tap_out: tap_in - Duration::days(1) + Duration::hours(8),
            }],
            open: Some(OpenSessionEntity { tap_in }),
        };
        let text = render(&state, tap_in + Duration::minutes(150))?;

        assert!(!text.contains("Not Tapped In"));
        assert!(text.contains("Tapped In"));
        assert!(text.contains("Since 09:00 AM (2h 30m)"));
        assert!(text.contains("Today\t\t2.50h"));
        assert!(text.contains("This month\t10.50h"));
        assert!(text.contains("Remaining\t189.50h"));
        Ok(())
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(Percentage::ZERO), "[....................]");
        assert_eq!(
            progress_bar(progress_percentage(50., 200.)),
            "[#####...............]"
        );
        assert_eq!(progress_bar(Percentage::FULL), "[####################]");
    }

    #[test]
    fn test_describe_outcome() {
        let tap_in = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let open = OpenSessionEntity { tap_in };

        assert_eq!(
            describe_outcome(&TapOutcome::TappedIn(open.clone()), &Utc),
            "Tapped in at 09:00 AM"
        );
        assert_eq!(
            describe_outcome(&TapOutcome::AlreadyTappedIn(open.clone()), &Utc),
            "Already tapped in since 09:00 AM"
        );
        assert_eq!(
            describe_outcome(
                &TapOutcome::TappedOut(open.close(tap_in + Duration::minutes(45))),
                &Utc
            ),
            "Tapped out at 09:45 AM after 45m"
        );
    }
}
