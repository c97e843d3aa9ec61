//! CLI entry point for inkpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(version)]
#[command(about = "A static site generator for personal blogs and portfolios", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
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

    /// Create a new post or page
    New {
        /// Layout to use (post, page)
        #[arg(short, long, default_value = "post")]
        layout: String,

        /// Title of the new document
        title: String,

        /// File name for the new document (without extension)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Build static files
    #[command(alias = "b")]
    Build {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,

        /// Ignore the freshness cache and rebuild everything
        #[arg(short, long)]
        force: bool,
    },

    /// Start a local server
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

    /// Clean the public folder and cache
    Clean,

    /// List site content
    List {
        /// Type of content to list (post, page)
        #[arg(default_value = "post")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "inkpress=debug,info"
    } else {
        "inkpress=info"
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
            inkpress::commands::init::init_site(&target_dir)?;
            println!("Initialized empty site in {:?}", target_dir);
        }

        Commands::New {
            layout,
            title,
            path,
        } => {
            let ink = inkpress::Inkpress::new(&base_dir)?;
            tracing::info!("Creating new {} with title: {}", layout, title);
            inkpress::commands::new::create_document(&ink, &title, &layout, path.as_deref())?;
        }

        Commands::Build { watch, force } => {
            let ink = inkpress::Inkpress::new(&base_dir)?;
            tracing::info!("Building static files...");

            inkpress::commands::build::run_with_options(&ink, force)?;
            println!("Build finished.");

            if watch {
                tracing::info!("Watching for file changes...");
                inkpress::commands::build::watch(&ink).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let ink = inkpress::Inkpress::new(&base_dir)?;

            tracing::info!("Building static files...");
            ink.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            inkpress::server::start(&ink, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let ink = inkpress::Inkpress::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            ink.clean()?;
            println!("Cleaned.");
        }

        Commands::List { r#type } => {
            let ink = inkpress::Inkpress::new(&base_dir)?;
            inkpress::commands::list::run(&ink, &r#type)?;
        }
    }

    Ok(())
}
