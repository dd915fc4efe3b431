use std::fmt;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use coach_core::model::{
    ExerciseDraft, SessionMode, SessionOutcome, SessionSnapshot, SessionSummary, WorkoutDraft,
};
use services::config::parse_rest_secs;
use services::{
    Clock, RemoteWorkoutSource, SessionConfig, SessionHandle, SessionIntent, WorkoutSessionService,
};
use storage::repository::{InMemoryWorkoutSource, JsonFileWorkoutSource, WorkoutSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidRest { raw: String },
    ConflictingSources,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidRest { raw } => write!(f, "invalid --rest value: {raw}"),
            ArgsError::ConflictingSources => write!(f, "--workout and --remote are exclusive"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  coach run      [--workout <path> | --remote] [--rest <secs>] [--verbose]");
    eprintln!("  coach validate [--workout <path> | --remote]");
    eprintln!();
    eprintln!("Without --workout or --remote a built-in demo workout is used.");
    eprintln!();
    eprintln!("During a session:");
    eprintln!("  <enter> / d   set done");
    eprintln!("  s             skip rest");
    eprintln!("  q             quit");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COACH_WORKOUT, COACH_REST_SECS, COACH_API_BASE_URL, COACH_API_TOKEN, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Validate,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "validate" => Some(Self::Validate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Demo,
    File(PathBuf),
    Remote,
}

#[derive(Debug)]
struct Args {
    source: Source,
    rest_secs: Option<u32>,
    verbose: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut file = std::env::var("COACH_WORKOUT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut remote = false;
        let mut rest_secs = None;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--workout" | "-w" => file = Some(PathBuf::from(require_value(args, "--workout")?)),
                "--remote" => remote = true,
                "--rest" => {
                    let value = require_value(args, "--rest")?;
                    let secs = parse_rest_secs(&value)
                        .map_err(|_| ArgsError::InvalidRest { raw: value.clone() })?;
                    rest_secs = Some(secs);
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let source = match (file, remote) {
            (Some(_), true) => return Err(ArgsError::ConflictingSources),
            (Some(path), false) => Source::File(path),
            (None, true) => Source::Remote,
            (None, false) => Source::Demo,
        };

        Ok(Self {
            source,
            rest_secs,
            verbose,
        })
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn demo_workout() -> WorkoutDraft {
    WorkoutDraft::new(vec![
        ExerciseDraft::new("Squat", 2, "10"),
        ExerciseDraft::new("Press", 1, "8"),
    ])
}

fn build_source(source: &Source) -> Arc<dyn WorkoutSource> {
    match source {
        Source::Demo => Arc::new(InMemoryWorkoutSource::new(demo_workout())),
        Source::File(path) => Arc::new(JsonFileWorkoutSource::new(path.clone())),
        Source::Remote => Arc::new(RemoteWorkoutSource::from_env()),
    }
}

fn parse_intent(line: &str) -> Option<SessionIntent> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "d" | "done" => Some(SessionIntent::CompleteSet),
        "s" | "skip" => Some(SessionIntent::SkipRest),
        "q" | "quit" | "abort" => Some(SessionIntent::Abort),
        _ => None,
    }
}

const REST_BAR_WIDTH: usize = 20;

fn rest_bar(fraction: f32) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((fraction * REST_BAR_WIDTH as f32).round() as usize).min(REST_BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(REST_BAR_WIDTH - filled))
}

fn render(snapshot: &SessionSnapshot, previous: Option<&SessionSnapshot>) {
    let mode_changed = previous.is_none_or(|prev| prev.mode != snapshot.mode);
    let mut out = std::io::stdout().lock();

    let _ = match snapshot.mode {
        SessionMode::Active => writeln!(
            out,
            "\n[{}/{}] {}  set {}/{}  reps: {}",
            snapshot.exercise_number,
            snapshot.total_exercises,
            snapshot.exercise_name,
            snapshot.current_set,
            snapshot.target_sets,
            snapshot.reps_label,
        ),
        SessionMode::Resting => write!(
            out,
            "{}Rest {:>3}s [{}]  (s = skip)",
            if mode_changed { "\n" } else { "\r" },
            snapshot.rest_remaining,
            rest_bar(snapshot.rest_fraction()),
        ),
        SessionMode::Completed => writeln!(out, "\nWorkout complete!"),
        SessionMode::Aborted => writeln!(out, "\nWorkout aborted."),
    };
    let _ = out.flush();
}

fn render_summary(summary: &SessionSummary) {
    let secs = summary.duration().num_seconds().max(0);
    let verb = match summary.outcome() {
        SessionOutcome::Completed => "completed",
        SessionOutcome::Aborted => "stopped after",
    };
    println!(
        "Session {verb} {}/{} sets in {}m {:02}s.",
        summary.sets_completed(),
        summary.total_sets(),
        secs / 60,
        secs % 60
    );
}

async fn drive(handle: SessionHandle) -> Result<SessionSummary, Box<dyn std::error::Error>> {
    let mut snapshots = handle.snapshots();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let mut last = handle.snapshot();
    render(&last, None);

    while !last.is_terminal() {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                render(&snapshot, Some(&last));
                last = snapshot;
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match parse_intent(&line) {
                        Some(intent) => handle.send(intent).await?,
                        None => eprintln!("unknown command: {} (d, s, q)", line.trim()),
                    },
                    None => {
                        tracing::info!("stdin closed, aborting session");
                        stdin_open = false;
                        handle.abort().await?;
                    }
                }
            }
        }
    }

    Ok(handle.finished().await?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with('-') => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with('-') {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_logging(parsed.verbose);

    let mut config = SessionConfig::from_env()?;
    if let Some(secs) = parsed.rest_secs {
        config = config.with_rest_ticks(secs);
    }
    let source = build_source(&parsed.source);

    match cmd {
        Command::Validate => {
            let draft = source.next_workout().await?;
            let workout = draft.validate()?;
            println!(
                "ok: {} exercises, {} sets",
                workout.len(),
                workout.total_sets()
            );
            for (i, exercise) in workout.exercises().iter().enumerate() {
                println!(
                    "  {}. {}  {} x {}",
                    i + 1,
                    exercise.name(),
                    exercise.target_sets(),
                    exercise.reps_label()
                );
            }
            Ok(())
        }
        Command::Run => {
            let service = WorkoutSessionService::new(Clock::system(), source, config);
            let handle = service.start_session().await?;
            let summary = drive(handle).await?;
            render_summary(&summary);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
