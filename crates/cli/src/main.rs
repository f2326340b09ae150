//! Inkpost CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! inkpost-cli migrate
//!
//! # Create a user (the first one becomes the blog owner)
//! INKPOST_USER_PASSWORD='...' inkpost-cli user create -e me@example.com -n "My Name"
//! ```
//!
//! Both commands read the database location from `BLOG_DATABASE_URL`
//! (or `DATABASE_URL`), defaulting to `sqlite://blog.db?mode=rwc`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "inkpost-cli")]
#[command(author, version, about = "Inkpost CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user. The password is read from `INKPOST_USER_PASSWORD`.
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { email, name } => {
                commands::user::create_user(&email, &name).await?;
            }
        },
    }
    Ok(())
}
