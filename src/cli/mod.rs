//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `repcoach shell`: interactive page shell
//! - `repcoach dashboard|analytics|profile|next-workout`: render a read page once
//! - `repcoach log-session|metrics|profile-update`: fill a draft and submit it
//! - `repcoach history`: show the request journal
//! - `repcoach health`: config and backend reachability
//! - `repcoach config show|init|set|reset`: configuration management

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::api::{ClientError, CoachApi, HttpClient};
use crate::config::{self, CoachConfig};
use crate::context::UserContext;
use crate::journal::{Journal, JournalEntry, Outcome};
use crate::pages::{Line, SubmitState, prescription_lines};
use crate::shell::{Command, Flow, HELP, Page, Route, Shell};

/// Output format for `history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal rendering
// ---------------------------------------------------------------------------

pub fn print_lines(lines: &[Line]) {
    for line in lines {
        match line {
            Line::Heading(text) => {
                println!();
                println!("{}", text.bold().cyan());
                println!("{}", "=".repeat(text.chars().count()));
            }
            Line::Text(text) => println!("  {text}"),
            Line::Notice(text) => println!("  {}", text.green()),
            Line::Error(text) => println!("  {}", text.red().bold()),
        }
    }
}

/// Mount `route` in a fresh shell, run its fetch, return the shell.
fn open_page<'a>(client: &'a HttpClient, config: &CoachConfig, route: Route) -> Shell<'a> {
    let ctx = UserContext::from_config(config);
    let mut shell = Shell::new(client, ctx, config.analytics.default_exercise.clone());
    if route != Route::Dashboard {
        shell.navigate(route.path());
    }
    shell.pump();
    shell
}

// ---------------------------------------------------------------------------
// repcoach shell
// ---------------------------------------------------------------------------

/// Interactive shell over stdin.
pub fn run_shell(config: &CoachConfig) -> Result<()> {
    let client = HttpClient::from_config(config);
    let mut shell = open_page(&client, config, Route::Dashboard);

    println!("{}", "repcoach shell".bold().cyan());
    println!("  {}", format!("backend: {}", client.base_url()).dimmed());
    println!("  {}", "Type 'help' for commands, 'quit' to leave.".dimmed());
    print_lines(&shell.render());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("\n{} ", format!("{}>", shell.route().path()).bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        line.clear();
        if input.read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }

        let wants_help = Command::parse_line(&line)
            .iter()
            .any(|c| matches!(c, Ok(Command::Help)));
        let results = shell.execute_line(&line);
        let mut quit = false;
        for result in &results {
            match result {
                Ok(Flow::Quit) => quit = true,
                Ok(Flow::Continue) => {}
                Err(err) => println!("  {}", err.to_string().red()),
            }
        }
        if quit {
            break;
        }
        if wants_help {
            print_help();
        }
        print_lines(&shell.render());
    }

    Ok(())
}

fn print_help() {
    println!("{}", "Commands".bold());
    for (usage, about) in HELP {
        println!("  {:<26} {}", usage.bold(), about.dimmed());
    }
}

// ---------------------------------------------------------------------------
// repcoach dashboard | analytics | profile | next-workout
// ---------------------------------------------------------------------------

pub fn run_dashboard(config: &CoachConfig) -> Result<()> {
    let client = HttpClient::from_config(config);
    let shell = open_page(&client, config, Route::Dashboard);
    print_lines(&shell.render_page());
    Ok(())
}

pub fn run_analytics(config: &CoachConfig, exercise: Option<String>) -> Result<()> {
    let mut config = config.clone();
    if let Some(exercise) = exercise {
        config.analytics.default_exercise = exercise;
    }
    let client = HttpClient::from_config(&config);
    let shell = open_page(&client, &config, Route::Analytics);
    print_lines(&shell.render_page());
    Ok(())
}

pub fn run_profile(config: &CoachConfig) -> Result<()> {
    let client = HttpClient::from_config(config);
    let shell = open_page(&client, config, Route::Profile);
    print_lines(&shell.render_page());
    Ok(())
}

pub fn run_next_workout(config: &CoachConfig) -> Result<()> {
    let client = HttpClient::from_config(config);
    let ctx = UserContext::from_config(config);

    println!("{}", "Next Workout".bold().cyan());
    println!("{}", "=".repeat(40));
    match client.get_next_workout(ctx.user_id) {
        Ok(workout) => print_lines(&prescription_lines(&workout)),
        Err(err) => print_lines(&[Line::Error(
            err.user_message("Failed to load next workout"),
        )]),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// repcoach log-session | metrics | profile-update
// ---------------------------------------------------------------------------

/// Fill a session draft from `--set` and `--exercise` flags and submit it.
///
/// Without `--exercise` the seeded row is submitted as is; otherwise the
/// given rows replace it, in order.
pub fn run_log_session(config: &CoachConfig, sets: &[String], exercises: &[String]) -> Result<()> {
    let client = HttpClient::from_config(config);
    let mut shell = open_page(&client, config, Route::LogSession);

    apply_assignments(&mut shell, sets)?;
    for (i, row) in exercises.iter().enumerate() {
        if i > 0 {
            shell.execute(Command::AddRow)?;
        }
        for (field, value) in parse_exercise(row)? {
            shell.execute(Command::Row {
                index: i,
                field: field.to_string(),
                value,
            })?;
        }
    }

    submit_and_print(&mut shell)
}

pub fn run_metrics(config: &CoachConfig, sets: &[String]) -> Result<()> {
    let client = HttpClient::from_config(config);
    let mut shell = open_page(&client, config, Route::Metrics);
    apply_assignments(&mut shell, sets)?;
    submit_and_print(&mut shell)
}

/// Load the stored profile, apply `--set` edits over it and save.
pub fn run_profile_update(config: &CoachConfig, sets: &[String]) -> Result<()> {
    let client = HttpClient::from_config(config);
    let mut shell = open_page(&client, config, Route::Profile);
    if let Page::Profile(page) = shell.page() {
        if !page.is_loaded() {
            let reason = page.submission().message().unwrap_or("Failed to load profile");
            bail!("Profile not saved: {reason}");
        }
    }
    apply_assignments(&mut shell, sets)?;
    submit_and_print(&mut shell)
}

fn apply_assignments(shell: &mut Shell<'_>, sets: &[String]) -> Result<()> {
    for assignment in sets {
        let (field, value) = parse_assignment(assignment)?;
        shell
            .execute(Command::Set { field, value })
            .with_context(|| format!("Invalid --set {assignment}"))?;
    }
    Ok(())
}

fn submit_and_print(shell: &mut Shell<'_>) -> Result<()> {
    let submitted = shell.execute(Command::Submit);
    shell.pump();
    print_lines(&shell.render_page());
    submitted.context("Draft was not submitted")?;
    let failed = shell
        .page()
        .submission()
        .filter(|submission| submission.state() == SubmitState::Failed);
    if let Some(submission) = failed {
        bail!(
            "Request failed: {}",
            submission.message().unwrap_or("no message")
        );
    }
    Ok(())
}

/// Parse `field=value`.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let Some((field, value)) = raw.split_once('=') else {
        bail!("Expected field=value, got '{raw}'");
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("Missing field name in '{raw}'");
    }
    Ok((field.to_string(), value.trim().to_string()))
}

const EXERCISE_COLUMNS: [&str; 5] = ["exercise", "sets", "reps", "load_kg", "rir"];

/// Parse `name,sets,reps,load,rir` into per-field edits.
pub fn parse_exercise(raw: &str) -> Result<Vec<(&'static str, String)>> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != EXERCISE_COLUMNS.len() {
        bail!("Expected name,sets,reps,load,rir, got '{raw}'");
    }
    Ok(EXERCISE_COLUMNS
        .iter()
        .zip(parts)
        .map(|(field, value)| (*field, value.to_string()))
        .collect())
}

// ---------------------------------------------------------------------------
// repcoach history
// ---------------------------------------------------------------------------

/// Show the most recent request journal entries.
pub fn run_history(config: &CoachConfig, limit: usize, format: OutputFormat) -> Result<()> {
    let Some(journal) = Journal::for_config(&config.logging) else {
        bail!("Could not resolve the request journal location");
    };
    let entries = journal.read_recent(limit);

    if entries.is_empty() {
        println!(
            "{}",
            "No requests journaled yet. Run a command that talks to the backend.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)?;
            println!("{json}");
        }
        OutputFormat::Table => print_history_table(&entries),
    }
    Ok(())
}

fn print_history_table(entries: &[JournalEntry]) {
    println!("{}", "Request Journal".bold().cyan());
    println!("{}", "=".repeat(80));
    println!(
        "  {:<25} {:<6} {:<28} {:>6} {:>8}  {}",
        "Time".bold(),
        "Method".bold(),
        "Path".bold(),
        "Status".bold(),
        "Latency".bold(),
        "Outcome".bold()
    );
    for entry in entries {
        let status = entry
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<25} {:<6} {:<28} {:>6} {:>6}ms  {}",
            truncate(&entry.timestamp, 25),
            entry.method,
            truncate(&entry.path, 28),
            status,
            entry.latency_ms,
            colorize_outcome(entry.outcome)
        );
        if let Some(message) = &entry.message {
            println!("  {:<25} {}", "", message.dimmed());
        }
    }
}

// ---------------------------------------------------------------------------
// repcoach health
// ---------------------------------------------------------------------------

/// Check config files, backend reachability and the journal.
pub fn run_health(config: &CoachConfig) -> Result<()> {
    println!("{}", "repcoach Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.repcoach/config.toml found"
        } else {
            "not found (run `repcoach config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".repcoach.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item("User", true, &format!("#{}", config.user.id));

    let client = HttpClient::new(&config.api.base_url);
    let (backend_ok, backend_detail) = match client.get_profile() {
        Ok(_) => (true, format!("reachable at {}", client.base_url())),
        Err(ClientError::Api(err)) => (
            true,
            format!("reachable, /profile answered {}: {}", err.status, err.message),
        ),
        Err(ClientError::Transport(reason)) => (
            false,
            format!("not reachable at {} ({reason})", client.base_url()),
        ),
    };
    print_health_item("Backend", backend_ok, &backend_detail);

    let journal = Journal::for_config(&config.logging);
    let journal_exists = journal.as_ref().is_some_and(|j| j.path().exists());
    let detail = match (&journal, config.logging.enabled) {
        (Some(j), true) if journal_exists => format!("{} entries", j.read_all().len()),
        (Some(_), true) => "no journal yet".to_string(),
        (Some(_), false) => "disabled ([logging] enabled = false)".to_string(),
        (None, _) => "no home directory".to_string(),
    };
    print_health_item("Request journal", journal_exists && config.logging.enabled, &detail);

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// repcoach config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective repcoach Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.repcoach/config.toml", global_exists);
    print_source(".repcoach.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "REPCOACH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.repcoach/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn colorize_outcome(outcome: Outcome) -> colored::ColoredString {
    let label = outcome.to_string();
    match outcome {
        Outcome::Ok => label.green(),
        Outcome::ApiError => label.yellow(),
        Outcome::TransportError => label.red(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
