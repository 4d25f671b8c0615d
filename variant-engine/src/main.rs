use std::future::Future;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use variant_engine::catalog::{ImportChoice, OptionEdit};
use variant_engine::reconcile::ReconcileReport;
use variant_engine::reconcile::export::export_products;
use variant_engine::services::{
    CatalogService, CloudSync, CostService, ImportOutcome, JobQueue, jobs, restore_backup,
};
use variant_engine::store::{ColumnLayout, RecoveryChoice, RecoveryPrompt};
use variant_engine::utils::csv::column_from_letters;
use variant_engine::{AppContext, AppError, AppResult, Config, ErrorCategory};

/// Product variation configurator
#[derive(Parser)]
#[command(name = "variant-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// What to do when the product database is corrupted beyond repair
    #[arg(long, value_enum, default_value_t = RecoveryMode::Ask, global = true)]
    recovery: RecoveryMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RecoveryMode {
    Ask,
    Restore,
    Empty,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConflictMode {
    Ask,
    Overwrite,
    Load,
    Cancel,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored products
    List,

    /// Import a variant spreadsheet (CSV with SKU, Options, Price, Weight)
    ImportVariants {
        file: PathBuf,
        /// What to do when the product already exists
        #[arg(long, value_enum, default_value_t = ConflictMode::Ask)]
        on_conflict: ConflictMode,
    },

    /// Rebuild a product's variant table from its stored rows
    Regenerate { base_sku: String },

    /// Overwrite every New SKU of a product
    GenerateSkus { base_sku: String },

    /// Edit one option's cost, weight or associated SKUs
    EditOption {
        base_sku: String,
        name: String,
        value: String,
        #[arg(long)]
        cost: Option<String>,
        #[arg(long)]
        weight: Option<String>,
        /// Associated-SKU field (`sku:cost:part, ...`); recomputes the cost
        #[arg(long)]
        associated: Option<String>,
    },

    /// Assign associated SKUs priced from the cost database
    SetAssociated {
        base_sku: String,
        name: String,
        value: String,
        /// SKUs, comma separated; empty clears the field
        #[arg(value_delimiter = ',')]
        skus: Vec<String>,
    },

    /// Recalculate all pricing from the cost database
    Recalc {
        /// Export every affected product afterwards
        #[arg(long)]
        export: bool,
    },

    /// Replace the cost database with a spreadsheet (Part Number, Price),
    /// or merge picked columns of a vendor sheet with `--merge`
    ImportCosts {
        file: PathBuf,
        /// Skip the recalculation that normally follows
        #[arg(long)]
        no_recalc: bool,
        /// Merge into the existing database; the sheet has no header row
        #[arg(long)]
        merge: bool,
        /// Part number column letter
        #[arg(long, default_value = "A", value_parser = parse_column, requires = "merge")]
        part_col: usize,
        /// Price column letter
        #[arg(long, default_value = "B", value_parser = parse_column, requires = "merge")]
        price_col: usize,
        /// Leading rows to ignore
        #[arg(long, default_value_t = 0, requires = "merge")]
        skip_rows: usize,
        /// Prepended to every part number
        #[arg(long, default_value = "", requires = "merge")]
        prefix: String,
    },

    /// Export the cost database to a spreadsheet
    ExportCosts { file: PathBuf },

    /// Search part numbers
    SearchCosts { needle: String },

    /// Set one part's price (non-numeric text is kept as is), then recalculate
    SetPrice { part: String, price: String },

    /// Rename a part number everywhere, then recalculate
    RenamePart { old: String, new: String },

    /// Report associated SKUs missing from the cost database
    MissingLinks {
        /// Add the missing parts back at their stored cost
        #[arg(long, conflicts_with = "remove")]
        reimport: bool,
        /// Remove the missing references from every product
        #[arg(long)]
        remove: bool,
        /// Limit `--remove` to these parts
        #[arg(long, value_delimiter = ',')]
        parts: Vec<String>,
    },

    /// Delete a product
    Delete {
        base_sku: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Rename a product's base SKU
    RenameBase { old: String, new: String },

    /// Export one product's variant table and stamp its last export
    Export {
        base_sku: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Find the variant for a full option selection (`Name=Value` pairs)
    SpotCheck {
        base_sku: String,
        selections: Vec<String>,
    },

    /// Open the product database, repairing it if needed
    Repair,

    /// Save the product database as a new timestamped snapshot
    Snapshot {
        /// Save to the working file instead
        #[arg(long)]
        working: bool,
    },

    /// Copy a backup snapshot into the working file
    Restore { backup: PathBuf },

    /// Cloud sync through the helper service
    Cloud {
        #[command(subcommand)]
        action: CloudAction,
    },
}

#[derive(Subcommand)]
enum CloudAction {
    /// Upload the product and cost databases
    Push,
    /// Download the newest product and cost databases
    Pull,
    /// Delete remote snapshots older than the retention window
    Purge,
    /// List remote snapshots
    List,
    /// Ask the helper service to exit
    Shutdown,
}

// =============================================================================
// Prompts
// =============================================================================

/// Lower-cased answer; end of input is an error
fn read_answer(mut input: impl BufRead, mut output: impl Write, question: &str) -> std::io::Result<String> {
    write!(output, "{question} ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "no answer on stdin",
        ));
    }
    Ok(line.trim().to_lowercase())
}

fn ask(question: &str) -> std::io::Result<String> {
    read_answer(std::io::stdin().lock(), std::io::stdout(), question)
}

/// Answer for prompts that cannot fail; unreadable input picks `fallback`
fn ask_or<T>(question: &str, fallback: T, pick: impl FnOnce(&str) -> T) -> T {
    match ask(question) {
        Ok(answer) => pick(&answer),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read an answer, using the safe choice");
            fallback
        }
    }
}

struct CliRecovery(RecoveryMode);

impl RecoveryPrompt for CliRecovery {
    fn choose(&mut self, corrupted: &Path, snapshot: Option<&Path>) -> RecoveryChoice {
        match self.0 {
            RecoveryMode::Restore => RecoveryChoice::RestoreSnapshot,
            RecoveryMode::Empty => RecoveryChoice::StartEmpty,
            RecoveryMode::Abort => RecoveryChoice::Abort,
            RecoveryMode::Ask => {
                eprintln!("{} is corrupted and could not be repaired.", corrupted.display());
                match snapshot {
                    Some(path) => eprintln!("Newest valid snapshot: {}", path.display()),
                    None => eprintln!("No valid snapshot found."),
                }
                let question = "[r]estore snapshot, start [e]mpty, or [a]bort?";
                ask_or(question, RecoveryChoice::Abort, |answer| match answer {
                    "r" | "restore" => RecoveryChoice::RestoreSnapshot,
                    "e" | "empty" => RecoveryChoice::StartEmpty,
                    _ => RecoveryChoice::Abort,
                })
            }
        }
    }
}

fn conflict_choice(mode: ConflictMode, key: &str) -> ImportChoice {
    match mode {
        ConflictMode::Overwrite => ImportChoice::Overwrite,
        ConflictMode::Load => ImportChoice::LoadExisting,
        ConflictMode::Cancel => ImportChoice::Cancel,
        ConflictMode::Ask => {
            let question = format!("{key} already exists. [o]verwrite, [l]oad existing, or [c]ancel?");
            ask_or(&question, ImportChoice::Cancel, |answer| match answer {
                "o" | "overwrite" => ImportChoice::Overwrite,
                "l" | "load" => ImportChoice::LoadExisting,
                _ => ImportChoice::Cancel,
            })
        }
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_reconcile(report: &ReconcileReport) {
    println!(
        "Reconciled: {} affected, {} rebuilt, {} failed",
        report.affected.len(),
        report.rebuilt,
        report.failed.len()
    );
    for key in &report.affected {
        println!("  updated  {key}");
    }
    for failure in &report.failed {
        println!("  FAILED   {}: {}", failure.base_sku, failure.error);
    }
    if let Some(path) = &report.saved_to {
        println!("Saved to {}", path.display());
    }
}

fn parse_column(raw: &str) -> Result<usize, String> {
    column_from_letters(raw).ok_or_else(|| format!("expected a column letter such as A or AB, got {raw:?}"))
}

fn parse_selection(raw: &str) -> AppResult<(String, String)> {
    raw.split_once('=')
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| AppError::validation(format!("expected Name=Value, got {raw:?}")))
}

// =============================================================================
// Commands
// =============================================================================

fn open_catalog(ctx: &AppContext, recovery: RecoveryMode) -> AppResult<CatalogService> {
    let catalog = CatalogService::open(ctx, &mut CliRecovery(recovery))?;
    if catalog.load_outcome().needs_attention() {
        println!("Database recovered: {:?}", catalog.load_outcome());
    }
    Ok(catalog)
}

/// Recalculate on the blocking pool, optionally exporting affected products
async fn recalc_job(ctx: &AppContext, recovery: RecoveryMode, export_after: bool) -> AppResult<()> {
    let (queue, mut events) = JobQueue::channel();
    let job_ctx = ctx.clone();
    queue.run_blocking("recalc", move || {
        let mut catalog = CatalogService::open(&job_ctx, &mut CliRecovery(recovery))?;
        let report = CostService::new(&job_ctx).recalc(catalog.store_mut())?;
        let exported = if export_after {
            Some(export_products(
                job_ctx.paths(),
                catalog.store(),
                &report.affected,
                Local::now(),
            )?)
        } else {
            None
        };
        Ok((report, exported))
    });

    let (report, exported) = jobs::wait(&mut events).await?;
    print_reconcile(&report);
    if let Some(exported) = exported {
        println!("Exported {} file(s) to {}", exported.written.len(), exported.dir.display());
        for (key, error) in &exported.failed {
            println!("  FAILED   {key}: {error}");
        }
    }
    Ok(())
}

/// Run a cloud transfer as a background job and wait for it
async fn cloud_job<T, Fut>(
    ctx: &AppContext,
    job: &'static str,
    work: impl FnOnce(AppContext) -> Fut,
) -> AppResult<T>
where
    T: Send + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
{
    let (queue, mut events) = JobQueue::channel();
    queue.run(job, work(ctx.clone()));
    jobs::wait(&mut events).await
}

async fn cloud(ctx: &AppContext, action: CloudAction) -> AppResult<()> {
    let sync = CloudSync::new(ctx)?;
    match action {
        CloudAction::Push => {
            let report = cloud_job(ctx, "cloud push", |ctx| async move { CloudSync::new(&ctx)?.push().await }).await?;
            for upload in [&report.products, &report.costs].into_iter().flatten() {
                match &upload.result {
                    Ok(id) => println!("Uploaded {} as {} ({id})", upload.local.display(), upload.remote_name),
                    Err(e) => println!("FAILED   {}: {e}", upload.local.display()),
                }
            }
            if !report.all_succeeded() {
                return Err(AppError::internal("one or more uploads failed"));
            }
        }
        CloudAction::Pull => {
            let report = cloud_job(ctx, "cloud pull", |ctx| async move { CloudSync::new(&ctx)?.pull().await }).await?;
            println!("Pulled {} into {}", report.products, report.working_file.display());
            match report.costs {
                Some(name) => println!("Pulled {name} into cost database"),
                None => println!("Warning: no cost database in the cloud"),
            }
        }
        CloudAction::Purge => {
            let report = sync.purge().await?;
            println!("Deleted {} remote file(s)", report.deleted.len());
            for (name, error) in &report.failed {
                println!("  FAILED   {name}: {error}");
            }
        }
        CloudAction::List => {
            for file in sync.list().await? {
                let when = file
                    .timestamp()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!("{when}  {}  {}", file.name, file.id);
            }
        }
        CloudAction::Shutdown => {
            ctx.cloud()?.shutdown().await?;
            println!("Helper service stopping");
        }
    }
    Ok(())
}

async fn run(ctx: AppContext, recovery: RecoveryMode, command: Commands) -> AppResult<()> {
    match command {
        Commands::List => {
            let catalog = open_catalog(&ctx, recovery)?;
            for key in catalog.products() {
                let stamp = catalog.store().last_export(&key).unwrap_or("never exported");
                println!("{key}\t{stamp}");
            }
        }
        Commands::ImportVariants { file, on_conflict } => {
            let mut catalog = open_catalog(&ctx, recovery)?;
            match catalog.import_variants(&file, |key| conflict_choice(on_conflict, key))? {
                ImportOutcome::Stored {
                    key,
                    replaced,
                    sku_warning,
                } => {
                    let verb = if replaced { "Replaced" } else { "Imported" };
                    println!("{verb} {key}");
                    if let Some(warning) = sku_warning {
                        println!("Warning: {warning}");
                    }
                }
                ImportOutcome::LoadedExisting { key } => println!("Kept stored {key}"),
                ImportOutcome::Cancelled { key } => {
                    println!("Import of {key} cancelled");
                    return Err(AppError::Cancelled);
                }
            }
        }
        Commands::Regenerate { base_sku } => {
            let rows = open_catalog(&ctx, recovery)?.regenerate(&base_sku)?;
            println!("Regenerated {rows} variant(s) for {base_sku}");
        }
        Commands::GenerateSkus { base_sku } => {
            let warning = open_catalog(&ctx, recovery)?.generate_skus(&base_sku)?;
            println!("Generated SKUs for {base_sku}");
            if let Some(warning) = warning {
                println!("Warning: {warning}");
            }
        }
        Commands::EditOption {
            base_sku,
            name,
            value,
            cost,
            weight,
            associated,
        } => {
            let edit = OptionEdit {
                cost,
                weight,
                associated,
            };
            open_catalog(&ctx, recovery)?.edit_option(&base_sku, &name, &value, &edit)?;
            println!("Updated {name}={value} on {base_sku}");
        }
        Commands::SetAssociated {
            base_sku,
            name,
            value,
            skus,
        } => {
            let report = open_catalog(&ctx, recovery)?.set_associated(&base_sku, &name, &value, &skus)?;
            println!("Mapped: {}", report.mapped.join(", "));
            if !report.missing.is_empty() {
                println!("Not in cost database (cost 0): {}", report.missing.join(", "));
            }
        }
        Commands::Recalc { export } => recalc_job(&ctx, recovery, export).await?,
        Commands::ImportCosts {
            file,
            no_recalc,
            merge,
            part_col,
            price_col,
            skip_rows,
            prefix,
        } => {
            let catalog = open_catalog(&ctx, recovery)?;
            let costs = CostService::new(&ctx);
            let report = if merge {
                let layout = ColumnLayout {
                    part_column: part_col,
                    price_column: price_col,
                    skip_rows,
                    prefix,
                };
                costs.import_costs_merge(&file, &layout, catalog.store())?
            } else {
                costs.import_costs(&file, catalog.store())?
            };
            println!("Imported {} part(s)", report.parts);
            for change in &report.overridden {
                println!("  {}: {} -> {}", change.part_number, change.old, change.new);
            }
            if !report.missing.is_empty() {
                println!("{} associated SKU(s) missing from the cost database", report.missing.len());
            }
            drop(catalog);
            if !no_recalc {
                recalc_job(&ctx, recovery, false).await?;
            }
        }
        Commands::ExportCosts { file } => {
            let parts = CostService::new(&ctx).export_costs(&file)?;
            println!("Exported {parts} part(s) to {}", file.display());
        }
        Commands::SearchCosts { needle } => {
            for (part, price) in CostService::new(&ctx).search(&needle)? {
                println!("{part}\t{price}");
            }
        }
        Commands::SetPrice { part, price } => {
            let mut catalog = open_catalog(&ctx, recovery)?;
            let edit = CostService::new(&ctx).set_price(catalog.store_mut(), &part, &price)?;
            match edit.previous {
                Some(old) => println!("{part}: {old} -> {price}"),
                None => println!("{part}: {price} (new)"),
            }
            print_reconcile(&edit.reconcile);
        }
        Commands::RenamePart { old, new } => {
            let mut catalog = open_catalog(&ctx, recovery)?;
            let report = CostService::new(&ctx).rename_part(catalog.store_mut(), &old, &new)?;
            print_reconcile(&report);
        }
        Commands::MissingLinks {
            reimport,
            remove,
            parts,
        } => {
            let mut catalog = open_catalog(&ctx, recovery)?;
            let costs = CostService::new(&ctx);
            if reimport {
                let (added, report) = costs.reimport_missing(catalog.store_mut())?;
                println!("Added {added} part(s) back to the cost database");
                print_reconcile(&report);
            } else if remove {
                let report = costs.remove_missing(catalog.store_mut(), &parts)?;
                print_reconcile(&report);
            } else {
                for link in costs.missing_links(catalog.store())? {
                    println!(
                        "{}\t{}={}\t{}\t{}",
                        link.base_sku, link.option_name, link.option_value, link.part, link.old_cost
                    );
                }
            }
        }
        Commands::Delete { base_sku, yes } => {
            let confirmed = yes || {
                let answer = ask(&format!("Delete {base_sku}? [y/N]"))
                    .map_err(|e| AppError::validation(format!("no confirmation: {e}")))?;
                matches!(answer.as_str(), "y" | "yes")
            };
            open_catalog(&ctx, recovery)?.delete(&base_sku, confirmed)?;
            println!("Deleted {base_sku}");
        }
        Commands::RenameBase { old, new } => {
            open_catalog(&ctx, recovery)?.rename_base(&old, &new)?;
            println!("Renamed {old} to {new}");
        }
        Commands::Export { base_sku, out } => {
            let written = open_catalog(&ctx, recovery)?.export(&base_sku, out.as_deref())?;
            println!("Exported {base_sku} to {}", written.display());
        }
        Commands::SpotCheck {
            base_sku,
            selections,
        } => {
            let selections = selections
                .iter()
                .map(|s| parse_selection(s))
                .collect::<AppResult<Vec<_>>>()?;
            let found = open_catalog(&ctx, recovery)?.spot_check(&base_sku, &selections)?;
            println!(
                "#{} {} -> {}  price {:.2}  weight {:.2}",
                found.variant.index, found.variant.sku, found.variant.new_sku, found.variant.price, found.variant.weight
            );
            for line in &found.breakdown.lines {
                println!("  {:<24} {:<24} {:>10} {:>10}", line.label, line.value, line.cost, line.weight);
            }
        }
        Commands::Repair => {
            let catalog = open_catalog(&ctx, recovery)?;
            println!("{}: {:?}", catalog.store().path().display(), catalog.load_outcome());
        }
        Commands::Snapshot { working } => {
            let mut catalog = open_catalog(&ctx, recovery)?;
            let path = if working {
                catalog.save_working()?
            } else {
                catalog.save_snapshot()?
            };
            println!("Saved {}", path.display());
        }
        Commands::Restore { backup } => {
            let path = restore_backup(&ctx, &backup)?;
            println!("Restored {} into {}", backup.display(), path.display());
        }
        Commands::Cloud { action } => cloud(&ctx, action).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match start(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = match e.downcast_ref::<AppError>().map(AppError::to_shared) {
                Some(report) => {
                    tracing::error!(
                        code = report.code.code(),
                        category = %report.code.category(),
                        context = ?report.context,
                        "{}",
                        report.message
                    );
                    if report.code.category() == ErrorCategory::Storage {
                        eprintln!("Hint: `repair` rewrites a damaged product database");
                    } else if report.code.category().is_data_problem() {
                        eprintln!("Hint: check the input spreadsheet or cost database");
                    }
                    report.exit_code()
                }
                None => 1,
            };
            std::process::exit(code);
        }
    }
}

async fn start(cli: Cli) -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    variant_engine::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    let ctx = AppContext::new(config).context("failed to prepare the database folder")?;
    tracing::debug!(?ctx, "Context ready");

    run(ctx, cli.recovery, cli.command).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_answer_normalizes() {
        let mut shown = Vec::new();
        let answer = read_answer(&b"  Yes \n"[..], &mut shown, "Delete X? [y/N]").unwrap();
        assert_eq!(answer, "yes");
        assert_eq!(shown, b"Delete X? [y/N] ");
    }

    #[test]
    fn test_closed_stdin_is_an_error() {
        let err = read_answer(&b""[..], std::io::sink(), "Overwrite?").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_column_flags() {
        assert_eq!(parse_column("c"), Ok(2));
        assert!(parse_column("3").is_err());
    }
}
