use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;

use commands::resources::{CvArgs, ProfileArgs, RefereeArgs, WorkArgs};

#[derive(Parser)]
#[command(name = "proven")]
#[command(about = "Proven CLI - manage your career profile from the terminal", long_about = None)]
struct Cli {
    /// Directory holding config.toml and the session file
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the session in every process sharing it
    Logout,
    /// Show who is signed in
    Status,
    /// Show completion, counts and records
    Dashboard,
    /// Edit personal details
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage work experience
    Work {
        #[command(subcommand)]
        action: WorkAction,
    },
    /// Manage referees
    Referee {
        #[command(subcommand)]
        action: RefereeAction,
    },
    /// Manage CVs
    Cv {
        #[command(subcommand)]
        action: CvAction,
    },
    /// Keep the session open; each line on stdin counts as activity
    Watch,
    /// Inspect or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Update the profile; omitted fields keep their current value
    Set(ProfileArgs),
}

#[derive(Subcommand)]
enum WorkAction {
    Add(WorkArgs),
    Update {
        id: String,
        #[command(flatten)]
        fields: WorkArgs,
    },
    Remove {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RefereeAction {
    Add(RefereeArgs),
    Remove {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CvAction {
    Add(CvArgs),
    Remove {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Store a new API base URL
    SetApiUrl { url: String },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let context = commands::Context::load(cli.config_dir)?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&context, name, email, password).await?,
        Commands::Login { email, password } => {
            commands::auth::login(&context, email, password).await?
        }
        Commands::Logout => commands::auth::logout(&context).await?,
        Commands::Status => commands::auth::status(&context).await?,
        Commands::Dashboard => commands::dashboard::show(&context).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Set(args) => commands::resources::set_profile(&context, args).await?,
        },
        Commands::Work { action } => match action {
            WorkAction::Add(args) => commands::resources::save_work(&context, None, args).await?,
            WorkAction::Update { id, fields } => {
                commands::resources::save_work(&context, Some(id), fields).await?
            }
            WorkAction::Remove { id, yes } => {
                commands::resources::remove_work(&context, id, yes).await?
            }
        },
        Commands::Referee { action } => match action {
            RefereeAction::Add(args) => commands::resources::add_referee(&context, args).await?,
            RefereeAction::Remove { id, yes } => {
                commands::resources::remove_referee(&context, id, yes).await?
            }
        },
        Commands::Cv { action } => match action {
            CvAction::Add(args) => commands::resources::add_cv(&context, args).await?,
            CvAction::Remove { id, yes } => commands::resources::remove_cv(&context, id, yes).await?,
        },
        Commands::Watch => commands::watch::run(&context).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&context)?,
            ConfigAction::SetApiUrl { url } => commands::config::set_api_url(&context, &url)?,
        },
    }

    Ok(())
}
