use std::{fmt::Display, io::Write, time::Duration};

use anyhow::Result;
use chrono::TimeZone;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    storage::{entities::SessionState, session_storage::SessionStorage},
    tracker::Tracker,
};

use super::status::print_status;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Keeps the status panel live until `shutdown` is cancelled. The panel is redrawn on every tick
/// while tapped in, otherwise only when the stored state changes.
pub async fn watch<S: SessionStorage, Tz: TimeZone>(
    tracker: &mut Tracker<S>,
    tz: &Tz,
    shutdown: CancellationToken,
    out: &mut impl Write,
) -> Result<()>
where
    Tz::Offset: Display,
{
    let mut tick = tracker.clock().instant();
    let mut rendered: Option<SessionState> = None;
    loop {
        tick += TICK_INTERVAL;

        tracker.refresh().await;
        if tracker.is_tapped_in() || rendered.as_ref() != Some(tracker.state()) {
            debug!("Rendering status, tapped in: {}", tracker.is_tapped_in());
            write!(out, "{CLEAR_SCREEN}")?;
            print_status(tracker.state(), &tracker.now().with_timezone(tz), out)?;
            writeln!(out, "\nPress Ctrl-C to stop watching")?;
            out.flush()?;
            rendered = Some(tracker.state().clone());
        }

        select! {
            _ = shutdown.cancelled() => {
                return Ok(())
            }
            _ = tracker.clock().sleep_until(tick) => ()
        }
    }
}
