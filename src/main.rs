//! # t
//!
//! Command-line entry point for the tcli Twitter client.
//!
//! ## Environment Variables
//!
//! - `TCLI_API_URL`: API base URL (defaults to `https://api.twitter.com`)
//! - `COLUMNS`: terminal width used for column listings
//! - `RUST_LOG`: log level (silent by default)
//!
//! ## Example Usage
//!
//! ```bash
//! t authorize --consumer-key KEY --consumer-secret SECRET
//! t timeline
//! t --location update "Hello from the command line"
//! RUST_LOG=debug t whois sferik
//! ```

use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use tcli::{App, Result, Settings, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "t", version, about = "A command-line client for Twitter")]
struct Cli {
    /// Path to the credential file (defaults to ~/.trc)
    #[arg(short = 'P', long, global = true)]
    profile: Option<PathBuf>,

    /// Do not open a browser
    #[arg(long, global = true)]
    dry_run: bool,

    /// Attach your current location to posted statuses
    #[arg(long, global = true)]
    location: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored accounts
    Accounts,
    /// Allow the client to access your Twitter account
    Authorize {
        #[arg(short = 'c', long)]
        consumer_key: String,
        #[arg(short = 's', long)]
        consumer_secret: String,
    },
    /// Block a user
    Block { screen_name: String },
    /// Direct messages sent to you
    #[command(alias = "dms")]
    DirectMessages,
    /// Direct messages you sent
    #[command(alias = "sent")]
    DirectMessagesSent,
    /// Send a direct message
    Dm { screen_name: String, text: String },
    /// Favorite a status
    Favorite { status_id: String },
    /// Statuses you favorited
    Favorites,
    /// Follow users
    Follow { screen_names: Vec<String> },
    /// Users you follow
    Followings,
    /// Users who follow you
    Followers,
    /// Users you follow who follow you back
    Friends,
    /// Users you follow who don't follow you back
    Leaders,
    /// Members of a list
    Members { owner: String, slug: String },
    /// Statuses mentioning you
    Mentions,
    /// Open a user's profile in a browser
    Open { screen_name: String },
    /// Reply to a status
    Reply { status_id: String, text: String },
    /// Report a user for spam
    ReportSpam { screen_name: String },
    /// Retweet a status
    Retweet { status_id: String },
    /// Retweets by you or another user
    Retweets { screen_name: Option<String> },
    /// Post a status
    #[command(alias = "update")]
    Status { text: String },
    /// Accounts you might want to follow
    Suggest,
    /// Your home timeline, or a user's statuses
    Timeline { screen_name: Option<String> },
    /// Unfollow users
    Unfollow { screen_names: Vec<String> },
    /// Look up users by screen name
    Users { screen_names: Vec<String> },
    /// Print the version
    Version,
    /// Show a user's profile
    Whois { screen_name: String },
}

/// Builds the settings for this invocation from the environment and flags.
fn settings_for(cli: &Cli) -> Settings {
    let mut settings = Settings::from_env();
    if let Some(path) = &cli.profile {
        settings = settings.with_profile_path(path);
    }
    settings.dry_run = cli.dry_run;
    settings.location = cli.location;
    settings
}

/// Dispatches a parsed command to the matching [`App`] method.
async fn run(cli: Cli) -> Result<()> {
    let settings = settings_for(&cli);
    let stdin = BufReader::new(io::stdin());
    let mut app = App::new(settings, Box::new(SystemClock), stdin, io::stdout());
    info!("Using credential file {}", app.rcfile().path().display());

    match cli.command {
        Command::Accounts => app.accounts(),
        Command::Authorize {
            consumer_key,
            consumer_secret,
        } => app.authorize(&consumer_key, &consumer_secret).await,
        Command::Block { screen_name } => app.block(&screen_name).await,
        Command::DirectMessages => app.direct_messages().await,
        Command::DirectMessagesSent => app.direct_messages_sent().await,
        Command::Dm { screen_name, text } => app.dm(&screen_name, &text).await,
        Command::Favorite { status_id } => app.favorite(&status_id).await,
        Command::Favorites => app.favorites().await,
        Command::Follow { screen_names } => app.follow(&screen_names).await,
        Command::Followings => app.followings().await,
        Command::Followers => app.followers().await,
        Command::Friends => app.friends().await,
        Command::Leaders => app.leaders().await,
        Command::Members { owner, slug } => app.members(&owner, &slug).await,
        Command::Mentions => app.mentions().await,
        Command::Open { screen_name } => app.open(&screen_name),
        Command::Reply { status_id, text } => app.reply(&status_id, &text).await,
        Command::ReportSpam { screen_name } => app.report_spam(&screen_name).await,
        Command::Retweet { status_id } => app.retweet(&status_id).await,
        Command::Retweets { screen_name } => app.retweets(screen_name.as_deref()).await,
        Command::Status { text } => app.status(&text).await,
        Command::Suggest => app.suggest().await,
        Command::Timeline { screen_name } => app.timeline(screen_name.as_deref()).await,
        Command::Unfollow { screen_names } => app.unfollow(&screen_names).await,
        Command::Users { screen_names } => app.users(&screen_names).await,
        Command::Version => app.version(),
        Command::Whois { screen_name } => app.whois(&screen_name).await,
    }
}

/// Main entry point for the `t` binary.
///
/// Initializes logging, parses the command line and runs one command on a
/// single-threaded runtime. Any error is printed to stderr and the process
/// exits with status 1.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize the logging system
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
