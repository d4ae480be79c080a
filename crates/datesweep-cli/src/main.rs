use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datesweep_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "datesweep")]
#[command(author, version, about = "Bulk-delete comments or media attachments by date range")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the admin web service
    Serve {
        /// Address to listen on (overrides server.bind_addr)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Write a configuration file with a fresh signing secret
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Insert sample records
    Seed {
        #[command(subcommand)]
        record: SeedRecord,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user and print its access token
    Add {
        #[arg(short, long)]
        login: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// administrator, editor, author or subscriber
        #[arg(short, long, default_value = "administrator")]
        role: String,
    },
    /// Issue a new access token, invalidating the old one
    ResetToken {
        login: String,
    },
}

#[derive(Subcommand)]
enum SeedRecord {
    /// Add a comment
    Comment {
        /// Date as YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS"
        #[arg(short, long)]
        date: String,
        #[arg(short, long, default_value = "Anonymous")]
        author: String,
        #[arg(short, long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(short, long, default_value_t = 1)]
        post_id: i64,
        /// Comment this one replies to
        #[arg(long)]
        parent: Option<i64>,
        /// approved, pending, spam or trash
        #[arg(short, long, default_value = "approved")]
        status: String,
    },
    /// Copy a file into the uploads directory and add an attachment for it
    Attachment {
        file: PathBuf,
        /// Date as YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS"
        #[arg(short, long)]
        date: String,
        /// Defaults to the file name without extension
        #[arg(short, long)]
        title: Option<String>,
        /// Login of the uploading user
        #[arg(short, long)]
        uploader: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    if let Some(Commands::Init { force }) = &cli.command {
        return commands::init::run(config_path, *force);
    }

    // Load configuration
    let config = AppConfig::load(config_path)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Some(Commands::Serve { bind }) => commands::serve::run(config, bind).await,
        None => commands::serve::run(config, None).await,
        Some(Commands::Init { .. }) => Ok(()),
        Some(Commands::User { action }) => match action {
            UserAction::Add {
                login,
                name,
                email,
                role,
            } => commands::user::add(&config, &login, &name, &email, &role).await,
            UserAction::ResetToken { login } => commands::user::reset_token(&config, &login).await,
        },
        Some(Commands::Seed { record }) => match record {
            SeedRecord::Comment {
                date,
                author,
                email,
                content,
                post_id,
                parent,
                status,
            } => {
                commands::seed::comment(
                    &config,
                    commands::seed::CommentArgs {
                        date,
                        author,
                        email,
                        content,
                        post_id,
                        parent,
                        status,
                    },
                )
                .await
            }
            SeedRecord::Attachment {
                file,
                date,
                title,
                uploader,
            } => commands::seed::attachment(&config, &file, &date, title, uploader.as_deref()).await,
        },
    }
}
