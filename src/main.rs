//! CLI entry point for blogfront

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogfront::server::ServeMode;
use blogfront::Blog;

#[derive(Parser)]
#[command(name = "blogfront")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Markdown blog with static generation, legacy redirects and locale subdomains", long_about = None)]
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
    /// Render the published posts into the public directory
    #[command(alias = "g")]
    Generate,

    /// Start the HTTP server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (overrides server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Serve the pre-rendered public directory only
        #[arg(long)]
        r#static: bool,
    },

    /// List posts
    List {
        /// Include drafts and scheduled posts
        #[arg(short, long)]
        all: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// File name without extension (defaults to the slugified title)
        #[arg(short, long)]
        slug: Option<String>,

        /// Stamp published_at with the current date
        #[arg(long)]
        publish: bool,
    },

    /// Remove generated pages from the public directory
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogfront=debug,info"
    } else {
        "blogfront=info"
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
        Commands::Generate => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            blog.generate()?;
            println!("Generated successfully!");
        }

        Commands::Serve { port, ip, r#static } => {
            let blog = Blog::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);
            let mode = if r#static {
                ServeMode::Static
            } else {
                ServeMode::Dynamic
            };

            blogfront::server::start(&blog, &ip, port, mode).await?;
        }

        Commands::List { all } => {
            let blog = Blog::new(&base_dir)?;
            blogfront::commands::list::run(&blog, all)?;
        }

        Commands::New {
            title,
            slug,
            publish,
        } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            blog.new_post(&title, slug.as_deref(), publish)?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("blogfront version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
