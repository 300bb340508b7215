use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use medlist_cli::{commands, init_tracing};
use medlist_core::config::Config;

/// Register → leaflets → export file → index, in one run.
#[derive(Parser)]
#[command(name = "medlist-indexer", version)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Hide the progress bar.
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = Config::load_from(args.config.as_deref())?.settings()?;

    println!("Medicinal products indexer\n==========================");
    println!("Register: {}", settings.data.registry_xml.display());
    println!("Index:    {}", settings.data.index_dir.display());

    let (summary, report) = commands::build(&settings, !args.quiet)?;

    println!("\nProducts in register: {}", summary.total);
    println!("Eligible products:    {}", summary.eligible);
    println!("With description:     {}", summary.extracted);
    println!("No fragment found:    {}", summary.not_found);
    println!("Invalid reference:    {}", summary.invalid_reference);
    println!("Fetch failures:       {}", summary.fetch_failures);
    println!("Indexed documents:    {} ({} replaced, {} rejected)", report.added, report.replaced, report.rejected.len());
    Ok(())
}
