use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "shop")]
#[command(about = "Shopfront CLI - sign in and talk to the storefront API", long_about = None)]
struct Cli {
    /// Directory holding config.toml and the session file
    #[arg(long, global = true, env = "SHOP_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        account: String,
        email: String,
        #[arg(long, env = "SHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in and store the session token
    Login {
        account: String,
        #[arg(long, env = "SHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Fetch the signed-in user's profile
    Profile,
    /// Sign out and clear the stored token
    Logout,
    /// Show the local session state
    Status,
    /// Resolve a page path through the navigation guard
    Open {
        #[arg(default_value = "/")]
        path: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let context = commands::context::AppContext::load(cli.config_dir.as_deref()).await?;

    match cli.command {
        Commands::Register {
            account,
            email,
            password,
        } => commands::session::register(&context, &account, &email, &password).await?,
        Commands::Login { account, password } => {
            commands::session::login(&context, &account, &password).await?
        }
        Commands::Profile => commands::session::profile(&context).await?,
        Commands::Logout => commands::session::logout(&context).await,
        Commands::Status => commands::session::status(&context).await,
        Commands::Open { path } => commands::open::run(context, &path).await?,
    }

    Ok(())
}
