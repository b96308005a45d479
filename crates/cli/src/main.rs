//! Home Care CLI - inspect and manage a file-backed profile.
//!
//! Works on the same `<data_dir>/<profile>/` layout the web app uses when
//! `HOMECARE_DATA_DIR` is set, so a profile can be prepared before a demo.
//!
//! # Usage
//!
//! ```bash
//! # Seed default tasks and users
//! hc-cli --data-dir ./data --profile demo seed
//!
//! # List overdue tasks by due date
//! hc-cli --profile demo tasks list --summary overdue --sort due_date
//!
//! # Add a user to the admin registry
//! hc-cli --profile demo users create -e sam@example.com -n "Sam Lee" -r user -p secret1
//!
//! # Wipe tasks, users and the login state
//! hc-cli --profile demo reset
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hc-cli")]
#[command(author, version, about = "Home Care CLI tools")]
struct Cli {
    /// Data directory (defaults to `HOMECARE_DATA_DIR`, then `./data`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Profile to operate on
    #[arg(long, global = true, default_value = "default")]
    profile: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed default tasks and users into an empty profile
    Seed,
    /// Remove tasks, users and login state from a profile
    Reset,
    /// Manage registry users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Inspect and update tasks
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Show the reminder cards the snap page would display now
    Reminders,
}

#[derive(Subcommand)]
enum UserAction {
    /// List users
    List {
        /// Case-insensitive match on name or email
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Create a user
    Create {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        name: String,

        /// `user` or `admin`
        #[arg(short, long, default_value = "user")]
        role: String,

        #[arg(short, long)]
        password: String,
    },
    /// Enable or disable a user
    Toggle { id: i64 },
    /// Delete a non-admin user
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TaskAction {
    /// List tasks
    List {
        #[arg(short, long, default_value = "")]
        search: String,

        /// `pending`, `in_progress`, `completed` or `overdue`
        #[arg(long)]
        status: Option<String>,

        /// `all`, `overdue`, `due_this_week` or `high_priority`
        #[arg(long, default_value = "all")]
        summary: String,

        /// Column to sort by, e.g. `due_date` or `cost`
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Change a task's status
    Status { id: i64, status: String },
    /// Print summary counts
    Summary,
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    let store = commands::open_store(cli.data_dir, &cli.profile)?;
    match cli.command {
        Commands::Seed => commands::profile::seed(&store)?,
        Commands::Reset => commands::profile::reset(&store)?,
        Commands::Reminders => commands::tasks::reminders(&store)?,
        Commands::Users { action } => match action {
            UserAction::List { search } => commands::users::list(&store, &search)?,
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => commands::users::create(&store, email, name, &role, password)?,
            UserAction::Toggle { id } => commands::users::toggle(&store, id)?,
            UserAction::Delete { id } => commands::users::delete(&store, id)?,
        },
        Commands::Tasks { action } => match action {
            TaskAction::List {
                search,
                status,
                summary,
                sort,
                desc,
            } => commands::tasks::list(
                &store,
                &commands::tasks::ListArgs {
                    search,
                    status,
                    summary,
                    sort,
                    desc,
                },
            )?,
            TaskAction::Status { id, status } => commands::tasks::set_status(&store, id, &status)?,
            TaskAction::Summary => commands::tasks::summary(&store)?,
        },
    }
    Ok(())
}
