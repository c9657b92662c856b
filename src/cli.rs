//! Command-line front end.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::admin::commands::{execute, parse_command, CommandError, Flow, HELP};
use crate::admin::render::AdminView;
use crate::admin::{AdminConsole, HttpAdminClient};
use crate::catalog::render::{render_detail, render_list};
use crate::catalog::{CatalogClient, Page, ProductId};
use crate::core::settings::{load_settings, ClientConfig, SettingsError, SettingsOverrides};
use crate::routes::Route;
use crate::shared::errors::ServiceError;
use crate::shared::http::ApiClient;

#[derive(Parser, Debug)]
#[command(name = "catalog-admin")]
#[command(about = "Browse the product catalog and manage its categories and tags")]
#[command(version)]
pub struct Cli {
    /// Catalog API base URL (overrides settings and CATALOG_ADMIN_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List products
    Products {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show one product
    Product { id: ProductId },
    /// Interactive category and tag console
    Admin,
    /// Open a front-end path such as /products/3 or /admin/products
    Open { path: String },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("No page at {0}")]
    NotFound(String),
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            api_url: self.api_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

pub async fn run_cli(cli: Cli) -> Result<(), CliError> {
    let config = load_settings().resolve(&cli.overrides())?;
    tracing::info!(target: "system", "Using catalog API at {}", config.base_url);
    let api = ApiClient::new(&config)?;

    match cli.command {
        Command::Products { limit, offset } => {
            show_products(&api, Page::new(limit, offset)).await
        }
        Command::Product { id } => show_product(&api, &id).await,
        Command::Admin => run_admin(api, &config).await,
        Command::Open { path } => open(api, &config, &path).await,
    }
}

async fn open(api: ApiClient, config: &ClientConfig, path: &str) -> Result<(), CliError> {
    match Route::resolve(path) {
        Route::ProductList => show_products(&api, Page::default()).await,
        Route::ProductDetail(id) => show_product(&api, &id).await,
        Route::AdminProducts => run_admin(api, config).await,
        Route::Redirect { to } => Err(CliError::NotFound(to.to_string())),
        Route::NotFound(path) => Err(CliError::NotFound(path)),
    }
}

async fn show_products(api: &ApiClient, page: Page) -> Result<(), CliError> {
    let products = CatalogClient::new(api.clone()).list_products(page).await?;
    println!("{}", render_list(&products));
    Ok(())
}

async fn show_product(api: &ApiClient, id: &ProductId) -> Result<(), CliError> {
    let product = CatalogClient::new(api.clone()).get_product(id).await?;
    println!("{}", render_detail(&product));
    Ok(())
}

/// Line-oriented admin console on stdin/stdout.
async fn run_admin(api: ApiClient, config: &ClientConfig) -> Result<(), CliError> {
    let service = Arc::new(HttpAdminClient::new(api));
    let mut console = AdminConsole::new(service, config.fetch_concurrency);
    let mut snapshots = console.subscribe();

    // a failed initial load is shown as the console error
    let _ = console.load().await;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        let view = AdminView::build(&snapshot, &console);
        stdout.write_all(view.render().as_bytes()).await?;
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                stdout.write_all(format!("{}\n", e).as_bytes()).await?;
                continue;
            }
        };

        match execute(&mut console, command).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::ShowHelp) => {
                stdout.write_all(format!("{}\n", HELP).as_bytes()).await?;
            }
            Ok(Flow::Redraw) | Err(_) => {}
        }
    }

    tracing::info!(target: "admin", "Admin console closed");
    Ok(())
}
