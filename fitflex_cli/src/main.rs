use chrono::Utc;
use clap::{Parser, Subcommand};
use fitflex_core::config::{DataConfig, SessionConfig};
use fitflex_core::snapshot::clear_snapshot;
use fitflex_core::*;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::{Arc, MutexGuard};

#[derive(Parser)]
#[command(name = "fitflex")]
#[command(about = "Workout session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the user id sessions are recorded under
    #[arg(long, global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List workouts in the catalog
    Workouts {
        /// Match title or description
        #[arg(long)]
        search: Option<String>,

        /// Category (Strength, Cardio, Bodyweight, Yoga)
        #[arg(long)]
        category: Option<String>,

        /// Difficulty (beginner, intermediate, advanced)
        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Start a workout and track it interactively
    Start {
        /// Workout id from `fitflex workouts`
        workout: String,

        /// Don't run the background clock (use `tick` to advance time)
        #[arg(long)]
        no_clock: bool,
    },

    /// Resume a suspended workout
    Resume {
        /// Don't run the background clock (use `tick` to advance time)
        #[arg(long)]
        no_clock: bool,
    },

    /// Show progress statistics
    Progress {
        /// Trend window in days
        #[arg(long)]
        days: Option<u32>,

        /// Number of recent workouts to list
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export history to CSV
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,

        /// Export the volume trend instead of individual sets
        #[arg(long)]
        trend: bool,

        /// Trend window in days (with --trend)
        #[arg(long)]
        days: Option<u32>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr; keep them quiet so they don't drown the prompts
    fitflex_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let user_id = cli.user.unwrap_or_else(|| config.user.id.clone());

    match cli.command {
        Commands::Workouts {
            search,
            category,
            difficulty,
        } => cmd_workouts(search, category, difficulty),
        Commands::Start { workout, no_clock } => {
            cmd_start(&data_dir, &user_id, &workout, no_clock, &config)
        }
        Commands::Resume { no_clock } => cmd_resume(&data_dir, no_clock, &config),
        Commands::Progress { days, limit } => cmd_progress(&data_dir, &user_id, days, limit, &config),
        Commands::Export { out, trend, days } => {
            cmd_export(&data_dir, &user_id, &out, trend, days, &config)
        }
    }
}

fn cmd_workouts(
    search: Option<String>,
    category: Option<String>,
    difficulty: Option<String>,
) -> Result<()> {
    let difficulty = difficulty.and_then(|d| {
        let parsed = Difficulty::parse(&d);
        if parsed.is_none() {
            eprintln!("Unknown difficulty: {}. Showing all difficulties.", d);
        }
        parsed
    });

    let filter = CatalogFilter {
        query: search,
        category,
        difficulty,
    };
    let workouts = get_default_catalog().search(&filter);

    if workouts.is_empty() {
        println!("No workouts match.");
        return Ok(());
    }

    for workout in workouts {
        println!(
            "{:<22} {}  ·  {}  ·  {}  ·  {} min",
            workout.id, workout.title, workout.category, workout.difficulty, workout.duration_minutes
        );
    }
    Ok(())
}

fn cmd_start(
    data_dir: &Path,
    user_id: &str,
    workout_id: &str,
    no_clock: bool,
    config: &Config,
) -> Result<()> {
    let snapshot_path = DataConfig::snapshot_path(data_dir);

    // One in-flight session at a time
    if let Some(suspended) = WorkoutSession::load(&snapshot_path)? {
        eprintln!(
            "A {} session of '{}' is suspended. Run `fitflex resume` to continue it.",
            suspended.status(),
            suspended.workout_title()
        );
        return Err(Error::Other("another session is in progress".into()));
    }

    let catalog = get_default_catalog();
    catalog.ensure_valid()?;
    let template = catalog.template(workout_id)?;
    let session = WorkoutSession::from_template(user_id, template)?;

    println!("\n{} · {} · {} · {} min", template.title, template.difficulty, template.category, template.duration_minutes);
    println!("Type 'start' to begin, 'help' for commands.");

    run_session(session, data_dir, no_clock, config)
}

fn cmd_resume(data_dir: &Path, no_clock: bool, config: &Config) -> Result<()> {
    let snapshot_path = DataConfig::snapshot_path(data_dir);
    let Some(session) = WorkoutSession::load(&snapshot_path)? else {
        println!("No suspended session found.");
        return Ok(());
    };

    println!("\nResuming {} at {}", session.workout_title(), format_elapsed(session.elapsed_seconds()));
    println!("Type 'start' to continue, 'help' for commands.");

    run_session(session, data_dir, no_clock, config)
}

/// A parsed line of interactive input
#[derive(Debug, PartialEq)]
enum SessionCommand {
    Start,
    Pause,
    Tick(u32),
    Done(usize),
    Weight(usize, f64),
    Reps(usize, i32),
    Next,
    Prev,
    Status,
    Finish,
    Abandon,
    Quit,
    Help,
}

/// What the input loop does after a command
enum Step {
    Continue,
    Finished(CompletedSessionRecord),
    Abandoned,
    Quit,
}

fn run_session(session: WorkoutSession, data_dir: &Path, no_clock: bool, config: &Config) -> Result<()> {
    let snapshot_path = DataConfig::snapshot_path(data_dir);
    let shared = fitflex_core::clock::share(session);

    let driver = if no_clock {
        None
    } else {
        Some(ClockDriver::spawn(Arc::clone(&shared), config.session.tick_interval()))
    };

    display_session(&*lock(&shared)?);

    let mut step = Step::Quit;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let command = match parse_command(&line, &config.session) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("✗ {}", msg);
                continue;
            }
        };
        tracing::debug!("Command: {:?}", command);

        let mut session = lock(&shared)?;
        match apply_command(&mut session, command) {
            Ok(Step::Continue) => {}
            Ok(done) => {
                step = done;
                break;
            }
            Err(e) if e.is_engine_error() => eprintln!("✗ {}", e),
            Err(e) => return Err(e),
        }
    }

    if let Some(driver) = driver {
        driver.stop();
    }

    let mut session = lock(&shared)?;
    match step {
        Step::Finished(record) => {
            let mut store = JsonlStore::new(DataConfig::records_path(data_dir));
            store.store(&record)?;
            clear_snapshot(&snapshot_path)?;

            println!("\n✓ Workout complete! {} in {}", record.workout_title, format_elapsed(record.duration_seconds));
            println!(
                "  {}/{} sets · volume {}",
                record.completed_sets().count(),
                record.set_count(),
                record.total_volume
            );
        }
        Step::Abandoned => {
            clear_snapshot(&snapshot_path)?;
            println!("\n✗ Workout abandoned. Nothing was recorded.");
        }
        Step::Quit | Step::Continue => {
            if session.status() == SessionStatus::Active {
                session.pause()?;
            }
            session.save(&snapshot_path)?;
            println!("\nSession suspended at {}. Run `fitflex resume` to continue.", format_elapsed(session.elapsed_seconds()));
        }
    }

    Ok(())
}

fn lock(shared: &SharedSession) -> Result<MutexGuard<'_, WorkoutSession>> {
    shared
        .lock()
        .map_err(|_| Error::Other("session lock poisoned".into()))
}

fn parse_command(line: &str, settings: &SessionConfig) -> std::result::Result<Option<SessionCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let set_arg = |i: usize| -> std::result::Result<usize, String> {
        let raw = args.get(i).ok_or_else(|| format!("'{}' needs a set number", word))?;
        match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("Invalid set number: {}", raw)),
            Ok(n) => Ok(n - 1),
        }
    };
    let reps_step = i32::try_from(settings.reps_step).unwrap_or(1);

    let command = match word.to_lowercase().as_str() {
        "start" | "resume" => SessionCommand::Start,
        "pause" => SessionCommand::Pause,
        "tick" => {
            let seconds = match args.first() {
                Some(raw) => raw.parse::<u32>().map_err(|_| format!("Invalid seconds: {}", raw))?,
                None => 1,
            };
            SessionCommand::Tick(seconds)
        }
        "done" => SessionCommand::Done(set_arg(0)?),
        "weight" => {
            let raw = args.get(1).ok_or("'weight' needs a set number and a change")?;
            let delta = raw.parse::<f64>().map_err(|_| format!("Invalid weight change: {}", raw))?;
            SessionCommand::Weight(set_arg(0)?, delta)
        }
        "reps" => {
            let raw = args.get(1).ok_or("'reps' needs a set number and a change")?;
            let delta = raw.parse::<i32>().map_err(|_| format!("Invalid reps change: {}", raw))?;
            SessionCommand::Reps(set_arg(0)?, delta)
        }
        "+w" => SessionCommand::Weight(set_arg(0)?, settings.weight_step),
        "-w" => SessionCommand::Weight(set_arg(0)?, -settings.weight_step),
        "+r" => SessionCommand::Reps(set_arg(0)?, reps_step),
        "-r" => SessionCommand::Reps(set_arg(0)?, -reps_step),
        "next" | "n" => SessionCommand::Next,
        "prev" | "p" => SessionCommand::Prev,
        "status" | "s" => SessionCommand::Status,
        "finish" => SessionCommand::Finish,
        "abandon" => SessionCommand::Abandon,
        "quit" | "q" => SessionCommand::Quit,
        "help" | "?" => SessionCommand::Help,
        other => return Err(format!("Unknown command: {} (try 'help')", other)),
    };

    Ok(Some(command))
}

fn apply_command(session: &mut WorkoutSession, command: SessionCommand) -> Result<Step> {
    let exercise_index = session.current_exercise_index();

    match command {
        SessionCommand::Start => {
            session.start()?;
            println!("▶ {} running at {}", session.workout_title(), format_elapsed(session.elapsed_seconds()));
        }
        SessionCommand::Pause => {
            session.pause()?;
            println!("⏸ Paused at {}", format_elapsed(session.elapsed_seconds()));
        }
        SessionCommand::Tick(seconds) => {
            for _ in 0..seconds {
                session.tick();
            }
            println!("⏱ {}", format_elapsed(session.elapsed_seconds()));
        }
        SessionCommand::Done(set_index) => {
            let completed = session.toggle_set_completion(exercise_index, set_index)?;
            if completed {
                println!("✓ Set {} complete", set_index + 1);
            } else {
                println!("○ Set {} marked incomplete", set_index + 1);
            }
        }
        SessionCommand::Weight(set_index, delta) => {
            let changed = session.adjust_set_weight(exercise_index, set_index, delta)?;
            report_set(session, set_index, changed);
        }
        SessionCommand::Reps(set_index, delta) => {
            let changed = session.adjust_set_reps(exercise_index, set_index, delta)?;
            report_set(session, set_index, changed);
        }
        SessionCommand::Next => {
            session.advance_exercise()?;
            display_session(session);
        }
        SessionCommand::Prev => {
            session.retreat_exercise()?;
            display_session(session);
        }
        SessionCommand::Status => display_session(session),
        SessionCommand::Finish => return Ok(Step::Finished(session.finish()?)),
        SessionCommand::Abandon => {
            session.abandon()?;
            return Ok(Step::Abandoned);
        }
        SessionCommand::Quit => return Ok(Step::Quit),
        SessionCommand::Help => print_help(),
    }

    Ok(Step::Continue)
}

fn report_set(session: &WorkoutSession, set_index: usize, changed: bool) {
    let set = &session.current_exercise().sets()[set_index];
    if changed {
        println!("  Set {}: {} × {}", set.set_number(), set.target_weight(), set.target_reps());
    } else if set.is_completed() {
        println!("  Set {} is complete; mark it incomplete to edit it", set.set_number());
    } else {
        println!("  Set {} unchanged: {} × {}", set.set_number(), set.target_weight(), set.target_reps());
    }
}

fn display_session(session: &WorkoutSession) {
    let exercise = session.current_exercise();
    let (done, total) = session.progress();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}  ·  {}  ·  {}", session.workout_title(), format_elapsed(session.elapsed_seconds()), session.status());
    println!("╰─────────────────────────────────────────╯");
    println!(
        "  Exercise {} of {}: {}",
        session.current_exercise_index() + 1,
        session.exercises().len(),
        exercise.name()
    );
    println!(
        "  {} sets × {} reps  ·  {}s rest  ·  {}/{} sets done overall",
        exercise.sets_count(),
        exercise.reps_per_set(),
        exercise.rest_seconds(),
        done,
        total
    );
    println!();
    for set in exercise.sets() {
        println!(
            "  [{}] Set {}  {} × {}",
            if set.is_completed() { "x" } else { " " },
            set.set_number(),
            set.target_weight(),
            set.target_reps()
        );
    }
    if session.is_last_exercise() {
        println!("\n  Last exercise: 'finish' when done.");
    }
    println!();
}

fn print_help() {
    println!("─────────────────────────────────────────");
    println!("  start / pause        run or pause the clock");
    println!("  done N               toggle set N of this exercise");
    println!("  weight N DELTA       change set N's weight");
    println!("  reps N DELTA         change set N's reps");
    println!("  +w N / -w N          weight up/down one step");
    println!("  +r N / -r N          reps up/down one step");
    println!("  next / prev          move between exercises");
    println!("  tick [SECONDS]       advance the clock by hand");
    println!("  status               show the current exercise");
    println!("  finish               finish on the last exercise");
    println!("  abandon              give up without recording");
    println!("  quit                 suspend and exit");
    println!("─────────────────────────────────────────");
}

fn cmd_progress(
    data_dir: &Path,
    user_id: &str,
    days: Option<u32>,
    limit: Option<usize>,
    config: &Config,
) -> Result<()> {
    let store = JsonlStore::new(DataConfig::records_path(data_dir));
    let records = store.fetch_history(user_id, None)?;

    let mut options = config.progress.options();
    if let Some(days) = days {
        options.window_days = days;
    }
    if let Some(limit) = limit {
        options.history_limit = limit;
    }

    let report = build_report(&records, Utc::now(), &options);
    let summary = &report.summary;

    println!("Total workouts: {}", summary.completed_workouts_count);
    println!("Total weight lifted: {:.0}", summary.total_weight_lifted);
    println!(
        "Last {} days: {} workouts",
        options.window_days,
        summary.recent_workouts_count()
    );

    if !summary.recent_trend.is_empty() {
        println!("\nVolume trend:");
        for point in &summary.recent_trend {
            println!("  {}  {}", point.date, point.volume);
        }
    }

    if !report.history.is_empty() {
        println!("\nRecent workouts:");
        for entry in &report.history {
            println!(
                "  {}  {}  {}/{} sets completed  {}",
                entry.started_at.format("%Y-%m-%d %H:%M"),
                entry.workout_title,
                entry.completed_sets,
                entry.total_sets,
                format_elapsed(entry.duration_seconds)
            );
        }
    }

    Ok(())
}

fn cmd_export(
    data_dir: &Path,
    user_id: &str,
    out: &Path,
    trend: bool,
    days: Option<u32>,
    config: &Config,
) -> Result<()> {
    let store = JsonlStore::new(DataConfig::records_path(data_dir));
    let records = store.fetch_history(user_id, None)?;

    let rows = if trend {
        let window_days = days.unwrap_or(config.progress.window_days);
        let summary = summarize(&records, Utc::now(), window_days);
        fitflex_core::export::write_trend_csv(&summary.recent_trend, out)?
    } else {
        fitflex_core::export::write_records_csv(&records, out)?
    };

    println!("✓ Exported {} rows to {}", rows, out.display());
    Ok(())
}
