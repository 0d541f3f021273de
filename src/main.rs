//! CLI entry point for notepress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notepress::query::ContentFilters;

#[derive(Parser)]
#[command(name = "notepress")]
#[command(version)]
#[command(about = "A static site generator for JSON-indexed markdown content hubs", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local preview server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List indexed content, optionally filtered
    List {
        /// Only show items of this type code
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Only show items carrying this topic
        #[arg(long)]
        topic: Option<String>,

        /// Only show items from this year
        #[arg(long)]
        year: Option<String>,

        /// Only show items matching this keyword
        #[arg(short, long)]
        keyword: Option<String>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "notepress=debug,info"
    } else {
        "notepress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            notepress::commands::init::init_site(&target_dir)?;
            println!("Initialized new notepress site in {:?}", target_dir);
        }

        Commands::Generate { watch } => {
            let app = notepress::Notepress::new(&base_dir)?;
            tracing::info!("Generating static files...");

            notepress::commands::generate::run(&app)?;
            println!("Generated successfully!");

            if watch {
                notepress::commands::generate::watch(&app).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let app = notepress::Notepress::new(&base_dir)?;

            // Generate first
            tracing::info!("Generating static files...");
            app.generate()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            notepress::server::start(&app, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let app = notepress::Notepress::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            app.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List {
            kind,
            topic,
            year,
            keyword,
        } => {
            let app = notepress::Notepress::new(&base_dir)?;
            let filters = ContentFilters {
                keyword: keyword.unwrap_or_default(),
                kind,
                topic,
                year,
            };
            notepress::commands::list::run(&app, &filters)?;
        }

        Commands::Version => {
            println!("notepress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
