use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use excel_upload_core::file::media_type_for_path;
use excel_upload_core::{
    ClientConfig, DeleteOutcome, Field, FormPatch, HttpUploadApi, Notification, SelectedFile,
    UploadError, UploadOrchestrator,
};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "excel-upload", about = "Upload ledger batches from Excel spreadsheets")]
struct Cli {
    /// Backend origin
    #[arg(long, global = true, env = "EXCEL_UPLOAD_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show branches, source codes and the defaults a new upload starts with
    Reference,
    /// List uploaded batches with their record counts
    Batches,
    /// Upload a spreadsheet as a new batch
    Upload {
        file: PathBuf,
        #[arg(long)]
        batch_no: String,
        /// Defaults to the first branch the backend lists
        #[arg(long)]
        branch: Option<String>,
        /// Defaults to the first source code the backend lists
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        exch_rate: Option<Decimal>,
        /// YYYY-MM-DD; defaults to the branch's working day
        #[arg(long)]
        entry_date: Option<NaiveDate>,
        /// Save the row error report into the download directory when rows fail
        #[arg(long)]
        save_report: bool,
    },
    /// Delete an uploaded batch
    Delete {
        batch_no: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Save the blank upload template into the download directory
    Template,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "excel_upload=info,excel_upload_core=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.clone() {
        config = config.with_base_url(base_url)?;
    }
    info!("Using backend {}", config.base_url);

    let orch = excel_upload_core::connect(config)?;
    let mut rx = orch.subscribe();

    let result = run(cli.command, &orch).await;
    print_notifications(&mut rx);
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Already printed as a notification.
        Err(e) if e.is::<UploadError>() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e),
    }
}

async fn run(command: Command, orch: &UploadOrchestrator<HttpUploadApi>) -> anyhow::Result<()> {
    match command {
        Command::Reference => {
            orch.initialize().await;
            println!("Branches:");
            for b in orch.branches() {
                println!("  {:<8} {}", b.code, b.name);
            }
            println!("Source codes:");
            for s in orch.source_codes() {
                println!("  {}", s.code);
            }
            let form = orch.form();
            println!(
                "Defaults: branch={} source={} exchRate={} entryDate={}",
                form.value(Field::BranchCode),
                form.value(Field::SourceCode),
                form.value(Field::ExchRate),
                form.value(Field::EntryDate)
            );
        }
        Command::Batches => {
            if !orch.load_batch_summary().await {
                bail!("could not load the batch list");
            }
            print_batches(orch);
        }
        Command::Upload {
            file,
            batch_no,
            branch,
            source,
            exch_rate,
            entry_date,
            save_report,
        } => {
            orch.initialize().await;
            if let Some(branch) = branch {
                orch.select_branch(&branch).await;
            }
            let mut patch = FormPatch::default().batch_no(batch_no);
            if let Some(source) = source {
                patch = patch.source_code(source);
            }
            if let Some(rate) = exch_rate {
                patch = patch.exch_rate(rate);
            }
            if let Some(date) = entry_date {
                patch = patch.entry_date(date);
            }
            orch.patch_form(patch);

            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            orch.on_file_selected(SelectedFile::new(file_name, media_type_for_path(&file), bytes))?;

            let result = orch.upload_file().await?;
            println!(
                "Batch {}: {} rows, {} imported, {} failed, {} skipped",
                result.batch_no,
                result.total_rows,
                result.success_count,
                result.error_count,
                result.skipped_rows()
            );
            if result.has_errors() {
                for e in &result.errors {
                    println!("  row {}: {}", e.row_number, e.error_message);
                }
                if save_report {
                    let path = orch.save_error_report()?;
                    println!("Error report saved to {}", path.display());
                }
            }
            if !result.success {
                return Err(UploadError::Rejected(result.message).into());
            }
            print_batches(orch);
        }
        Command::Delete { batch_no, yes } => {
            orch.patch_form(FormPatch::default().batch_no(batch_no));
            let outcome = orch.delete_batch(|b| yes || confirm_delete(b)).await?;
            if outcome == DeleteOutcome::Cancelled {
                warn!("Delete cancelled");
            } else {
                print_batches(orch);
            }
        }
        Command::Template => {
            let path = orch.download_template().await?;
            println!("Template saved to {}", path.display());
        }
    }
    Ok(())
}

fn confirm_delete(batch_no: &str) -> bool {
    print!("Are you sure you want to delete batch {}? [y/N] ", batch_no);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn print_batches(orch: &UploadOrchestrator<HttpUploadApi>) {
    let batches = orch.batches();
    if !orch.is_batch_list_current() {
        warn!("Batch list could not be refreshed");
        if batches.is_empty() {
            return;
        }
        println!("Last known batches:");
    } else if batches.is_empty() {
        println!("No batches uploaded yet");
        return;
    }
    println!("{:<22} {:>8}", "Batch", "Records");
    for b in batches {
        println!("{:<22} {:>8}", b.batch_no, b.record_count);
    }
}

fn print_notifications(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(n) = rx.try_recv() {
        eprintln!("{}", n);
    }
}
