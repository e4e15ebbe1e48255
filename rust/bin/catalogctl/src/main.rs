//! `catalogctl`: command-line admin client for the product catalog.
//!
//! Manages contexts and authentication, lists and edits products, and
//! resolves category breadcrumbs.

mod commands;
mod config;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use catalog_admin::model::ProductDraft;
use commands::products::UpdateArgs;
use commands::Connection;
use config::ClientConfig;

/// Catalog admin CLI.
#[derive(Parser, Debug)]
#[command(name = "catalogctl", about = "Product catalog admin client")]
struct Cli {
    /// Path to client config file (default: ~/.catalog/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    /// Override a setting for this run, e.g. `--set items-per-page=20`.
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    set: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts.
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Login to the current context's server.
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Password (not recommended; prefer the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Clear the token from the current context.
    Logout,

    /// Show the logged-in user and the pages they may view.
    Whoami,

    /// List products.
    Products {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Filter by search term.
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Single product operations.
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// Print a random category breadcrumb chain.
    Breadcrumbs,

    /// Check server status.
    Status,

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        name: String,
        #[arg(long)]
        server: String,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(Subcommand, Debug)]
enum ProductAction {
    /// Show one product.
    Get { id: u64 },

    /// Add a product.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        quantity: u32,
        #[arg(long)]
        price: String,
        #[arg(long)]
        manufacturer: u64,
        #[arg(long, default_value = "")]
        photo_url: String,
        /// Listing page the product is added from.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Edit a product.
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        manufacturer: Option<u64>,
        /// Upload a new image file with the edit.
        #[arg(long)]
        image: Option<String>,
    },

    /// Delete a product.
    Delete {
        id: u64,
        /// Listing page the product is deleted from.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);

    run(cli, &config_path)
        .await
        .map_err(|e| commands::explain(e, &config_path))
}

async fn run(cli: Cli, config_path: &Path) -> anyhow::Result<()> {
    let json_output = cli.output == "json";
    let config = ClientConfig::load(config_path)?;
    let overrides: Vec<String> = cli.set.iter().map(|kv| format!("--{}", kv)).collect();
    let settings = config.settings.clone().apply_args(&overrides);

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create { name, server } => {
                commands::context::create(&name, &server, config_path)?;
            }
            ContextAction::List => {
                commands::context::list(config_path)?;
            }
            ContextAction::Set { name, server } => {
                commands::context::set(&name, server.as_deref(), config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, config_path)?;
            }
        },

        Commands::Login { email, password } => {
            let email = match email {
                Some(e) => e,
                None => prompt("Email: ")?,
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::login::login(&email, &password, settings, config_path).await?;
        }

        Commands::Logout => {
            commands::login::logout(config_path)?;
        }

        Commands::Whoami => {
            let conn = Connection::open(&config, settings)?;
            commands::login::whoami(&conn, json_output).await?;
        }

        Commands::Products { page, search } => {
            let conn = Connection::open(&config, settings)?;
            commands::products::list(&conn, page, search, json_output).await?;
        }

        Commands::Product { action } => {
            let conn = Connection::open(&config, settings)?;
            match action {
                ProductAction::Get { id } => {
                    commands::products::get(&conn, id, json_output).await?;
                }
                ProductAction::Create {
                    name,
                    quantity,
                    price,
                    manufacturer,
                    photo_url,
                    page,
                } => {
                    let draft = ProductDraft {
                        name,
                        quantity,
                        price,
                        photo_url,
                        manufacturer_id: manufacturer,
                    };
                    commands::products::create(&conn, draft, page).await?;
                }
                ProductAction::Update {
                    id,
                    name,
                    quantity,
                    price,
                    manufacturer,
                    image,
                } => {
                    let args = UpdateArgs {
                        name,
                        quantity,
                        price,
                        manufacturer,
                        image,
                    };
                    commands::products::update(&conn, id, args).await?;
                }
                ProductAction::Delete { id, page, yes } => {
                    if !yes && !prompt("Are you sure? [y/N]: ")?.eq_ignore_ascii_case("y") {
                        println!("Cancelled.");
                        return Ok(());
                    }
                    commands::products::delete(&conn, id, page).await?;
                }
            }
        }

        Commands::Breadcrumbs => {
            let conn = Connection::open(&config, settings)?;
            commands::breadcrumbs::show(&conn).await?;
        }

        Commands::Status => {
            let conn = Connection::open(&config, settings)?;
            commands::login::status(&conn).await?;
        }

        Commands::Version => {
            println!("catalogctl v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush()?;
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}
