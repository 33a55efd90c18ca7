use anyhow::Result;
use clap::{Parser, Subcommand};

use repcoach::cli;
use repcoach::config::{self, CoachConfig};

#[derive(Debug, Parser)]
#[command(name = "repcoach")]
#[command(about = "Terminal front end for an adaptive strength-training coach")]
struct App {
    /// Backend API root, e.g. http://127.0.0.1:8000/api
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Act on behalf of this user id
    #[arg(long, global = true)]
    user_id: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive shell with page navigation
    Shell,
    /// Next workout, latest metrics and recent sessions
    Dashboard,
    /// Weekly volume, e1RM trend and readiness summary
    Analytics {
        /// Exercise for the e1RM trend (default from config)
        #[arg(long)]
        exercise: Option<String>,
    },
    /// Show the stored profile
    Profile,
    /// Show only the prescribed next workout
    NextWorkout,
    /// Log a training session
    LogSession {
        /// Metrics field assignment, e.g. --set sleep_hours=7.5
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,
        /// Exercise row as name,sets,reps,load,rir (repeatable)
        #[arg(long = "exercise", value_name = "ROW")]
        exercises: Vec<String>,
    },
    /// Record daily readiness metrics without a session
    Metrics {
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,
    },
    /// Edit and save the profile
    ProfileUpdate {
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,
    },
    /// Show recent backend requests from the journal
    History {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check config, backend reachability and the request journal
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default ~/.repcoach/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `api.base_url`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn resolve_config(app: &App) -> CoachConfig {
    let mut config = config::load();
    if let Some(url) = &app.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(id) = app.user_id {
        config.user.id = id;
    }
    config
}

fn main() -> Result<()> {
    let app = App::parse();
    let config = resolve_config(&app);

    match app.command {
        Commands::Shell => cli::run_shell(&config),
        Commands::Dashboard => cli::run_dashboard(&config),
        Commands::Analytics { exercise } => cli::run_analytics(&config, exercise),
        Commands::Profile => cli::run_profile(&config),
        Commands::NextWorkout => cli::run_next_workout(&config),
        Commands::LogSession { sets, exercises } => {
            cli::run_log_session(&config, &sets, &exercises)
        }
        Commands::Metrics { sets } => cli::run_metrics(&config, &sets),
        Commands::ProfileUpdate { sets } => cli::run_profile_update(&config, &sets),
        Commands::History { limit, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(&config, limit, fmt)
        }
        Commands::Health => cli::run_health(&config),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
