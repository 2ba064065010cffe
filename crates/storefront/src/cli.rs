//! `bookstore` command line.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use bookstore_cart::{CartEngine, Notice, NoticeBus, Severity};
use bookstore_catalog::{Book, CatalogQuery, FilterDimension, LoadState};
use bookstore_core::Sku;

use crate::api::HttpCatalogSource;
use crate::config::StorefrontConfig;
use crate::local_store::SqliteKeyValueStore;
use crate::storefront::Storefront;

/// Top-level CLI parser for the `bookstore` binary.
#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about = "Browse the bookstore catalog and manage your cart")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show one page of the catalog.
    Browse(BrowseArgs),
    /// Books related to the given SKU.
    Related { sku: Sku },
    /// Inspect or change the cart.
    #[command(subcommand)]
    Cart(CartCommands),
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub study_level: Option<String>,
    #[arg(long)]
    pub curriculum: Option<String>,
    #[arg(long)]
    pub grade: Option<String>,
    /// Case-insensitive match on name or description.
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

impl BrowseArgs {
    fn filters(&self) -> [(FilterDimension, Option<&str>); 4] {
        [
            (FilterDimension::Category, self.category.as_deref()),
            (FilterDimension::StudyLevel, self.study_level.as_deref()),
            (FilterDimension::Curriculum, self.curriculum.as_deref()),
            (FilterDimension::Grade, self.grade.as_deref()),
        ]
    }
}

#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// Print the cart.
    Show,
    /// Add copies of a book.
    Add {
        sku: Sku,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a book's quantity; 0 or less removes it.
    Set {
        sku: Sku,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a book.
    Remove { sku: Sku },
    /// Remove everything.
    Clear,
}

impl Commands {
    fn needs_catalog(&self) -> bool {
        !matches!(
            self,
            Commands::Cart(
                CartCommands::Show
                    | CartCommands::Set { .. }
                    | CartCommands::Remove { .. }
                    | CartCommands::Clear
            )
        )
    }
}

/// Execute one command against the configured backend and local store.
pub async fn run(cli: Cli, config: StorefrontConfig) -> anyhow::Result<()> {
    let store = Arc::new(SqliteKeyValueStore::open(config.db_path()));
    let bus = Arc::new(NoticeBus::new());
    let notices = bus.subscribe();

    let mut storefront = Storefront::launch(&config, store, bus)
        .await
        .context("failed to start storefront")?;

    if cli.command.needs_catalog() {
        load_catalog(&mut storefront, &config).await?;
    }

    let output = execute(&mut storefront, cli.command);
    // Persist before reporting, even when the command failed.
    storefront.shutdown().await;

    for notice in notices.drain() {
        println!("{}", render_notice(&notice));
    }
    print!("{}", output?);
    Ok(())
}

async fn load_catalog(storefront: &mut Storefront, config: &StorefrontConfig) -> anyhow::Result<()> {
    let source = HttpCatalogSource::from_config(config).context("failed to build HTTP client")?;
    storefront.refresh(&source).await;

    if let LoadState::Failed(reason) = storefront.catalog().load_state() {
        anyhow::bail!("could not load catalog from {}: {reason}", source.items_url());
    }
    Ok(())
}

fn execute(storefront: &mut Storefront, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Browse(args) => {
            let catalog = storefront.catalog_mut();
            for (dimension, value) in args.filters() {
                if let Some(value) = value {
                    catalog.set_filter(dimension, value);
                }
            }
            if let Some(term) = &args.search {
                catalog.set_search_term(term.as_str());
            }
            catalog.set_page(args.page);
            Ok(render_page(catalog))
        }
        Commands::Related { sku } => {
            let related = storefront.related(&sku)?;
            if related.is_empty() {
                return Ok(format!("No related books for {sku}.\n"));
            }
            Ok(related.into_iter().map(render_book).collect())
        }
        Commands::Cart(CartCommands::Add { sku, quantity }) => {
            storefront.add_to_cart(&sku, quantity)?;
            render_cart(storefront.cart())
        }
        Commands::Cart(CartCommands::Set { sku, quantity }) => {
            storefront.cart_mut().update_quantity(&sku, quantity);
            render_cart(storefront.cart())
        }
        Commands::Cart(CartCommands::Remove { sku }) => {
            storefront.cart_mut().remove_from_cart(&sku);
            render_cart(storefront.cart())
        }
        Commands::Cart(CartCommands::Clear) => {
            storefront.cart_mut().clear_cart();
            render_cart(storefront.cart())
        }
        Commands::Cart(CartCommands::Show) => render_cart(storefront.cart()),
    }
}

fn render_book(book: &Book) -> String {
    format!("{:<14} {:<40} {:>10}\n", book.sku, book.name, book.price)
}

pub fn render_page(catalog: &CatalogQuery) -> String {
    let mut out: String = catalog.visible_items().into_iter().map(render_book).collect();
    let _ = writeln!(
        out,
        "Page {} of {} ({} books)",
        catalog.current_page(),
        catalog.total_pages(),
        catalog.total_items()
    );

    let suggestions = catalog.suggestions();
    if !suggestions.is_empty() {
        let _ = writeln!(out, "Suggestions: {}", suggestions.join(", "));
    }
    out
}

pub fn render_cart(cart: &CartEngine) -> anyhow::Result<String> {
    if cart.cart().is_empty() {
        return Ok("Your cart is empty.\n".to_string());
    }

    let mut out = String::new();
    for entry in cart.cart().entries() {
        let book = entry.book();
        let _ = writeln!(
            out,
            "{:<14} {:<40} x{:<4} {:>10}",
            book.sku,
            book.name,
            entry.quantity(),
            entry.line_total()?
        );
    }
    let _ = writeln!(
        out,
        "{} items, {} units, total {}",
        cart.count(),
        cart.cart().total_units(),
        cart.total()?
    );
    Ok(out)
}

pub fn render_notice(notice: &Notice) -> String {
    let level = match notice.severity {
        Severity::Info => "info",
        Severity::Success => "success",
        Severity::Warning => "warning",
    };
    format!("[{level}] {}: {}", notice.title, notice.message)
}
