pub mod history;
pub mod prompt;
pub mod shutdown;
pub mod status;
pub mod watch;

use std::{
    env,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use history::{print_history, HISTORY_LIMIT};
use prompt::confirm;
use shutdown::detect_shutdown;
use status::{describe_outcome, print_status};
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    storage::{
        export::export_sessions,
        session_storage::{JsonSessionStorage, SessionStorage},
    },
    tracker::{TapOutcome, Tracker},
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_application_path},
        logging::{enable_logging, CLI_PREFIX},
    },
};

const CLEAR_QUESTION: &str =
    "Are you sure you want to clear all attendance data? This cannot be undone!";

#[derive(Parser, Debug)]
#[command(name = "tapclock", version, long_about = None)]
#[command(about = "Tap in and out of work and see how far along you are this month", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start a work session")]
    In,
    #[command(about = "Finish the current work session")]
    Out,
    #[command(about = "Show today's and this month's hours")]
    Status,
    #[command(about = "Show status and keep it updated every second while tapped in")]
    Watch,
    #[command(about = "List the latest sessions, newest first")]
    History {
        #[arg(short, long, default_value_t = HISTORY_LIMIT, help = "How many sessions to show")]
        limit: usize,
    },
    #[command(about = "Write all sessions into attendance-data-<date>.json")]
    Export {
        #[arg(
            short,
            long,
            help = "Directory to write the export into. Defaults to the current directory"
        )]
        output: Option<PathBuf>,
    },
    #[command(about = "Delete all sessions. Asks for confirmation")]
    Clear {
        #[arg(short, long, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, create_application_path)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let storage = JsonSessionStorage::new(app_dir.join("data"))?;
    let mut tracker = Tracker::load(storage, Box::new(DefaultClock)).await;
    let mut out = io::stdout();

    match args.commands {
        Commands::In => {
            let outcome = tracker.tap_in().await?;
            report_tap(&tracker, &outcome, &mut out)
        }
        Commands::Out => {
            let outcome = tracker.tap_out().await?;
            report_tap(&tracker, &outcome, &mut out)
        }
        Commands::Status => print_status(
            tracker.state(),
            &tracker.now().with_timezone(&Local),
            &mut out,
        ),
        Commands::Watch => {
            let shutdown = CancellationToken::new();
            let (_, result) = tokio::join!(detect_shutdown(shutdown.clone()), async {
                let result = watch::watch(&mut tracker, &Local, shutdown.clone(), &mut out).await;
                shutdown.cancel();
                result
            });
            result
        }
        Commands::History { limit } => {
            print_history(&tracker.state().sessions, limit, &Local, &mut out)
        }
        Commands::Export { output } => {
            let dir = output.map_or_else(env::current_dir, Ok)?;
            let path = export_sessions(&tracker.state().sessions, tracker.now(), &dir).await?;
            writeln!(
                out,
                "Exported {} sessions to {}",
                tracker.state().sessions.len(),
                path.display()
            )?;
            Ok(())
        }
        Commands::Clear { yes } => {
            if !yes && !confirm(CLEAR_QUESTION, &mut io::stdin().lock(), &mut out)? {
                info!("Clearing declined");
                writeln!(out, "Nothing was cleared")?;
                return Ok(());
            }
            tracker.clear_all().await?;
            writeln!(out, "All attendance data cleared")?;
            Ok(())
        }
    }
}

fn report_tap<S: SessionStorage>(
    tracker: &Tracker<S>,
    outcome: &TapOutcome,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "{}", describe_outcome(outcome, &Local))?;
    writeln!(out)?;
    print_status(tracker.state(), &tracker.now().with_timezone(&Local), out)
}
