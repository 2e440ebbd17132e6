use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rango_core::{slug::legacy, CategoryId, Directory, DirectoryConfig, Slug};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod table;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Table format (default)
    Table,
    /// Pretty JSON
    Json,
}

#[derive(Parser)]
#[command(name = "rango")]
#[command(about = "Rango directory CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty directory file
    Create {
        /// Directory file path
        path: PathBuf,
    },
    /// Seed the directory with sample categories and pages
    Populate {
        /// Directory file path (created if missing)
        path: PathBuf,
    },
    /// List categories
    Categories {
        /// Directory file path
        path: PathBuf,
        /// Only the N most liked categories
        #[arg(short, long)]
        top: Option<usize>,
        /// Output format (table, json)
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
    /// List pages, optionally of a single category
    Pages {
        /// Directory file path
        path: PathBuf,
        /// Category name (any case) or slug
        #[arg(short, long)]
        category: Option<String>,
        /// Output format (table, json)
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
    /// Add a category
    AddCategory {
        /// Directory file path
        path: PathBuf,
        /// Category name
        name: String,
    },
    /// Add a page to a category
    AddPage {
        /// Directory file path
        path: PathBuf,
        /// Category name (any case) or slug
        category: String,
        /// Page title
        title: String,
        /// Page URL (http:// is added when no scheme is given)
        url: String,
    },
    /// Like a category
    Like {
        /// Directory file path
        path: PathBuf,
        /// Category name (any case) or slug
        category: String,
    },
    /// Show how a name encodes to a slug, or decode a slug
    Slug {
        /// Name to encode, or slug with --decode
        value: String,
        /// Decode instead of encode
        #[arg(short, long)]
        decode: bool,
        /// Use the legacy underscore codec
        #[arg(long)]
        legacy: bool,
    },
    /// Show directory statistics
    Stats {
        /// Directory file path
        path: PathBuf,
    },
}

fn open(path: &Path) -> Result<Directory> {
    Directory::open(path, DirectoryConfig::default())
        .with_context(|| format!("Failed to open directory {}", path.display()))
}

/// Resolve a category by name first, then by slug
fn resolve_category(directory: &Directory, category: &str) -> Result<CategoryId> {
    if let Ok(found) = directory.find_category(category) {
        return Ok(found.id);
    }
    tracing::debug!("No category named {:?}, trying it as a slug", category);
    match directory.find_category_by_slug(category) {
        Ok(found) => Ok(found.id),
        Err(_) => bail!("Category {:?} does not exist", category),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create { path } => {
            Directory::create(&path, DirectoryConfig::default())
                .context("Failed to create directory")?;
            println!("Directory created: {}", path.display());
        }

        Commands::Populate { path } => {
            let directory = Directory::open_or_create(&path, DirectoryConfig::default())
                .context("Failed to open directory")?;
            let report = directory.populate().context("Failed to populate directory")?;
            directory.flush().context("Failed to save directory")?;
            println!(
                "Populated: {} categories and {} pages added",
                report.categories_added, report.pages_added
            );
            println!("{}", table::format_categories_table(&directory.categories()));
        }

        Commands::Categories { path, top, output } => {
            let directory = open(&path)?;
            let categories = match top {
                Some(n) => directory.top_categories(n),
                None => directory.categories(),
            };

            match output {
                OutputFormat::Table => println!("{}", table::format_categories_table(&categories)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&categories)?),
            }
        }

        Commands::Pages {
            path,
            category,
            output,
        } => {
            let directory = open(&path)?;
            let pages = match category {
                Some(category) => {
                    let id = resolve_category(&directory, &category)?;
                    directory.pages_for(id)?
                }
                None => directory.top_pages(usize::MAX),
            };

            match output {
                OutputFormat::Table => {
                    let names: HashMap<CategoryId, String> = directory
                        .categories()
                        .into_iter()
                        .map(|c| (c.id, c.name))
                        .collect();
                    let output = table::format_pages_table(&pages, |page| {
                        names.get(&page.category).cloned().unwrap_or_else(|| "-".to_string())
                    });
                    println!("{}", output);
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pages)?),
            }
        }

        Commands::AddCategory { path, name } => {
            let directory = open(&path)?;
            let category = directory
                .add_category(&name)
                .context("Failed to add category")?;
            directory.flush().context("Failed to save directory")?;
            println!("Category {} added: /category/{}/", category.id, category.slug());
        }

        Commands::AddPage {
            path,
            category,
            title,
            url,
        } => {
            let directory = open(&path)?;
            let id = resolve_category(&directory, &category)?;
            let page = directory
                .add_page(id, &title, &url)
                .context("Failed to add page")?;
            directory.flush().context("Failed to save directory")?;
            println!("Page {} added: {}", page.id, page.url);
        }

        Commands::Like { path, category } => {
            let directory = open(&path)?;
            let id = resolve_category(&directory, &category)?;
            let likes = directory.like_category(id)?;
            directory.flush().context("Failed to save directory")?;
            println!("{}", likes);
        }

        Commands::Slug {
            value,
            decode,
            legacy: use_legacy,
        } => {
            let result = match (decode, use_legacy) {
                (false, false) => Slug::from_name(&value).to_string(),
                (true, false) => Slug::parse(&value).context("Invalid slug")?.to_name(),
                (false, true) => legacy::encode(&value),
                (true, true) => legacy::decode(&value),
            };
            println!("{}", result);
        }

        Commands::Stats { path } => {
            let directory = open(&path)?;
            println!("{}", serde_json::to_string_pretty(&directory.stats())?);
        }
    }

    Ok(())
}
