use clap::{Parser, Subcommand};
use mission_control::application::commands::{
    AppState, hydrate_impl, login_impl, logout_impl, retry_failed_loads_impl,
    session_status_impl,
};
use mission_control::domain::focus::{Session, build_cycle, format_clock};
use mission_control::domain::models::{
    CycleMode, DEFAULT_LONG_BREAK_MINUTES, DEFAULT_SHORT_BREAK_MINUTES, DEFAULT_WORK_MINUTES,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "mission-control", version, about = "Mission Control dashboard core")]
struct Args {
    /// Workspace holding `config/` and `logs/`. Defaults to the current directory.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every collection and print the hydration status as JSON.
    Status {
        /// Retry kinds that failed to load once before reporting.
        #[arg(long)]
        retry: bool,
    },
    /// Store the bearer token used for every request.
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        username: Option<String>,
    },
    /// Forget the stored bearer token.
    Logout,
    /// Print who the stored session belongs to and where it is kept.
    Whoami,
    /// Print the sessions of one focus cycle.
    Cycle {
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(3..=5))]
        mode: u32,
        #[arg(long, default_value_t = DEFAULT_WORK_MINUTES)]
        work: u32,
        #[arg(long, default_value_t = DEFAULT_SHORT_BREAK_MINUTES)]
        short: u32,
        #[arg(long, default_value_t = DEFAULT_LONG_BREAK_MINUTES)]
        long: u32,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlannedSession {
    index: usize,
    #[serde(flatten)]
    session: Session,
    clock: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), String> {
    if let Command::Cycle {
        mode,
        work,
        short,
        long,
    } = args.command
    {
        return print_cycle(mode, work, short, long);
    }

    let workspace_root = match args.workspace {
        Some(path) => path,
        None => std::env::current_dir().map_err(|error| error.to_string())?,
    };
    let state = AppState::open(&workspace_root).map_err(|error| error.to_string())?;

    match args.command {
        Command::Status { retry } => {
            let mut status = hydrate_impl(&state).await;
            if retry && !status.errors.is_empty() {
                retry_failed_loads_impl(&state).await;
                status = state.data().hydration();
            }
            print_json(&status)
        }
        Command::Login { token, username } => login_impl(&state, token, username)
            .map_err(|error| state.command_error("login", &error)),
        Command::Logout => logout_impl(&state).map_err(|error| state.command_error("logout", &error)),
        Command::Whoami => {
            let session = session_status_impl(&state)
                .map_err(|error| state.command_error("whoami", &error))?;
            print_json(&session)
        }
        Command::Cycle { .. } => Ok(()),
    }
}

fn print_cycle(mode: u32, work: u32, short: u32, long: u32) -> Result<(), String> {
    if work == 0 || short == 0 || long == 0 {
        return Err("durations must be > 0 minutes".to_string());
    }
    let mode = CycleMode::from_repetitions(mode)
        .ok_or_else(|| format!("unsupported cycle mode {mode}; expected 3, 4 or 5"))?;
    let plan = build_cycle(mode, work, short, long)
        .into_iter()
        .enumerate()
        .map(|(index, session)| PlannedSession {
            index,
            session,
            clock: format_clock(session.duration_seconds),
        })
        .collect::<Vec<_>>();
    print_json(&plan)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|error| error.to_string())?;
    println!("{rendered}");
    Ok(())
}
