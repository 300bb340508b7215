use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use medlist_cli::{commands, init_tracing, present};
use medlist_core::config::{Config, Settings};
use medlist_core::SortMode;
use medlist_leaflet::DocumentKind;

/// Search the medicinal-products register by what the leaflets say a
/// product is used for.
#[derive(Parser)]
#[command(name = "medlist", version)]
struct Cli {
    /// Extra TOML file merged over `config.toml`; relative data paths are
    /// resolved against its directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch leaflets of the register's products and write the export file.
    Export,
    /// Rebuild the index from the export file.
    Index,
    /// Export, then index.
    Build,
    /// Free-text search over titles, common names and leaflet fragments.
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t = SortArg::Relevance)]
        sort: SortArg,
        /// Print hits as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the indexed description of a product.
    Show { id: String },
    /// Print the register entry of a product.
    Info { id: String },
    /// Save the leaflet or characteristics PDF into the downloads directory.
    Download {
        id: String,
        #[arg(long, value_enum, default_value_t = KindArg::Leaflet)]
        kind: KindArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Relevance,
    Alphabetical,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => SortMode::Relevance,
            SortArg::Alphabetical => SortMode::Alphabetical,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Leaflet,
    Spec,
}

impl From<KindArg> for DocumentKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Leaflet => DocumentKind::Leaflet,
            KindArg::Spec => DocumentKind::Characteristics,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings: Settings = Config::load_from(cli.config.as_deref())?.settings()?;

    match cli.command {
        Commands::Export => {
            let summary = commands::export(&settings, true)?;
            println!(
                "Processed {} register products, {} eligible, {} with a description; wrote {}",
                summary.total,
                summary.eligible,
                summary.extracted,
                settings.data.export_csv.display()
            );
        }
        Commands::Index => {
            let report = commands::index(&settings)?;
            println!(
                "Indexed {} documents ({} replaced, {} rejected) into {}",
                report.added,
                report.replaced,
                report.rejected.len(),
                settings.data.index_dir.display()
            );
        }
        Commands::Build => {
            let (summary, report) = commands::build(&settings, true)?;
            println!(
                "Built index of {} documents from {} register products ({} with a description)",
                report.added, summary.total, summary.extracted
            );
        }
        Commands::Search { query, limit, sort, json } => {
            let engine = commands::open_engine(&settings)?;
            let limit = settings.search.effective_limit(limit);
            let hits = engine.search(&query, limit, sort.into())?;
            if json {
                println!("{}", present::hits_json(&hits)?);
            } else {
                println!("{}", present::hits_table(&hits));
            }
        }
        Commands::Show { id } => {
            let engine = commands::open_engine(&settings)?;
            match engine.get(&id)? {
                Some(doc) => {
                    println!("{} ({})\n", doc.title, doc.common_name);
                    println!("{}", present::display_description(&doc.usage_text));
                }
                None => anyhow::bail!("no indexed product with id {id}"),
            }
        }
        Commands::Info { id } => {
            let registry = commands::load_registry(&settings)?;
            let record = commands::find_product(&registry, &id)?;
            println!("{}", present::product_details(record));
        }
        Commands::Download { id, kind } => {
            let registry = commands::load_registry(&settings)?;
            let record = commands::find_product(&registry, &id)?;
            let path = commands::download(&settings, record, kind.into())?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}
