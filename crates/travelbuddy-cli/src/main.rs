mod commands;

use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use travelbuddy_core::api::HttpJsonSource;
use travelbuddy_core::{Config, TravelBuddy};

#[derive(Parser)]
#[command(
    name = "travelbuddy",
    version,
    about = "Plan trips, browse destinations and track travel budgets"
)]
struct Cli {
    /// Keep all data in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List or search destinations
    Destinations {
        /// Text to match against name, country or description
        #[arg(short, long, default_value = "")]
        search: String,
        /// Continent, e.g. Europe
        #[arg(long)]
        continent: Option<String>,
        /// Price band: budget, mid-range, luxury
        #[arg(long)]
        budget: Option<String>,
        /// Destination type tag, e.g. beach
        #[arg(long = "type")]
        destination_type: Option<String>,
    },
    /// Show one destination
    Destination {
        /// Destination ID
        id: String,
        /// Also look the country up online
        #[arg(long)]
        country_info: bool,
    },
    /// List activities
    Activities {
        /// Activity type, e.g. Sightseeing
        #[arg(long = "type")]
        activity_type: Option<String>,
    },
    /// Drop the cached destination list and fetch it again
    Refresh,
    /// List trips
    Trips {
        /// upcoming, ongoing, completed, draft or all
        #[arg(long, default_value = "all")]
        status: String,
        /// Text to match against name or destination
        #[arg(short, long, default_value = "")]
        search: String,
        /// none, date-desc, date-asc, name-asc, name-desc
        #[arg(long, default_value = "none")]
        sort: String,
    },
    /// Show one trip with its itinerary
    Trip {
        /// Trip ID
        id: String,
    },
    /// Plan a new trip
    Plan {
        /// Trip name
        name: String,
        #[arg(long)]
        destination: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        #[arg(long, default_value_t = 1)]
        travelers: u32,
        /// Planned budget
        #[arg(long)]
        budget: Option<f64>,
        /// Fill the itinerary with suggested activities
        #[arg(long)]
        suggest: bool,
    },
    /// Delete a trip
    DeleteTrip {
        /// Trip ID
        id: String,
    },
    /// Copy a trip into a new draft
    DuplicateTrip {
        /// Trip ID
        id: String,
    },
    /// Print one trip, or every trip, as JSON
    Export {
        /// Trip ID (default: all trips)
        id: Option<String>,
    },
    /// Save a trip exported as JSON as a new draft
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Show a trip's budget
    Budget {
        /// Trip ID
        trip: String,
    },
    /// Record an expense against a trip's budget
    AddExpense {
        /// Trip ID
        trip: String,
        description: String,
        amount: f64,
        /// Budget category, e.g. "Food & Dining"
        #[arg(short, long)]
        category: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Trip and spending totals
    Stats,
    /// Show or edit the user profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Achievement progress
    Achievements,
    /// Suggested activities, restaurants and places to stay
    Suggest,
    /// Add or remove a favorite destination
    Favorite {
        /// Destination ID
        id: String,
    },
    /// Travel photos, from Unsplash when an access key is configured
    Gallery,
    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        message: String,
    },
    /// Store the Unsplash access key in the OS keychain
    SetPhotoKey {
        key: String,
    },
    /// Remove the Unsplash access key from the OS keychain
    ClearPhotoKey,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Change profile fields
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Preferred currency code, e.g. EUR
        #[arg(long)]
        currency: Option<String>,
    },
    /// Use an image file as the avatar
    Avatar {
        file: PathBuf,
    },
    /// Print the profile and achievements as JSON
    Export,
    /// Restore the default profile fields
    Reset,
    /// Delete every trip, budget and profile setting
    DeleteAccount {
        /// Required to actually delete
        #[arg(long)]
        yes: bool,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). With a log directory,
/// events are also appended to a daily rolling file; the returned guard
/// must live until exit so buffered lines are flushed.
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "travelbuddy.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn open_core(config: &Config, ephemeral: bool) -> Result<TravelBuddy> {
    if ephemeral {
        debug!("Using in-memory storage");
        let source = HttpJsonSource::new(config.catalog_base_url())
            .context("Failed to create catalog client")?;
        return Ok(TravelBuddy::in_memory(Arc::new(source))
            .with_suggestion_delay(config.suggestion_delay()));
    }
    TravelBuddy::open(config)
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let guard = init_tracing(cli.log_dir.as_ref());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        drop(guard);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let core = open_core(&config, cli.ephemeral)?;
    let json = cli.json;

    match cli.command {
        Commands::Destinations {
            search,
            continent,
            budget,
            destination_type,
        } => {
            commands::destinations(&core, &search, continent, budget, destination_type, json).await
        }
        Commands::Destination { id, country_info } => {
            commands::destination(&core, &id, country_info, json).await
        }
        Commands::Activities { activity_type } => {
            commands::activities(&core, activity_type.as_deref(), json).await
        }
        Commands::Refresh => commands::refresh(&core).await,
        Commands::Trips {
            status,
            search,
            sort,
        } => commands::trips(&core, &status, search, &sort, json),
        Commands::Trip { id } => commands::trip(&core, &id, json),
        Commands::Plan {
            name,
            destination,
            start,
            end,
            travelers,
            budget,
            suggest,
        } => {
            let plan = commands::PlanArgs {
                name,
                destination,
                start,
                end,
                travelers,
                budget,
                suggest,
            };
            commands::plan(&core, plan, json).await
        }
        Commands::DeleteTrip { id } => commands::delete_trip(&core, &id),
        Commands::DuplicateTrip { id } => commands::duplicate_trip(&core, &id),
        Commands::Export { id } => commands::export(&core, id.as_deref()),
        Commands::Import { file } => commands::import(&core, &file),
        Commands::Budget { trip } => commands::budget(&core, &trip, json),
        Commands::AddExpense {
            trip,
            description,
            amount,
            category,
            date,
        } => commands::add_expense(&core, &trip, description, amount, category, date),
        Commands::Stats => commands::stats(&core, json),
        Commands::Profile { command } => match command {
            None => commands::profile(&core, json),
            Some(ProfileCommands::Set {
                name,
                email,
                bio,
                phone,
                location,
                currency,
            }) => commands::profile_set(&core, name, email, bio, phone, location, currency),
            Some(ProfileCommands::Avatar { file }) => commands::profile_avatar(&core, &file),
            Some(ProfileCommands::Export) => commands::profile_export(&core),
            Some(ProfileCommands::Reset) => commands::profile_reset(&core),
            Some(ProfileCommands::DeleteAccount { yes }) => commands::delete_account(&core, yes),
        },
        Commands::Achievements => commands::achievements(&core, json),
        Commands::Suggest => commands::suggest(&core, json).await,
        Commands::Favorite { id } => commands::favorite(&core, &id),
        Commands::Gallery => commands::gallery(&config, json).await,
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => commands::contact(&core, name, email, subject, message),
        Commands::SetPhotoKey { key } => commands::set_photo_key(&key),
        Commands::ClearPhotoKey => commands::clear_photo_key(),
    }
}
