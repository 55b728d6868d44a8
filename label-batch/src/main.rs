use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use label_batch::ledger::LEDGER_FILE_NAME;
use label_batch::{
    BatchProcessor, BatchReport, Config, DatasetSource, ProgressLedger, RangeRequest,
    chunk_file_name, init_logger, source_key, split, write_chunks,
};
use label_printer::LabelTransport;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "label-batch", version, about = "Print EZPL labels from CSV row ranges")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split the input dataset into numbered chunk files
    Split {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print a row range of a dataset or chunk file
    Print(PrintArgs),
    /// Send one label, to check the printer and stock alignment
    TestLabel {
        #[arg(long)]
        epc: String,
        /// QR content; defaults to the EPC
        #[arg(long)]
        qr: Option<String>,
        #[arg(long)]
        simulate: bool,
    },
    /// Show where each source left off
    Progress,
}

#[derive(Args)]
struct PrintArgs {
    /// Dataset file to print from
    #[arg(long, required_unless_present = "chunk", conflicts_with = "chunk")]
    source: Option<PathBuf>,
    /// Chunk number, resolved to `split_part_NN.csv` in the output directory
    #[arg(long)]
    chunk: Option<usize>,
    /// First row to print (1-based)
    #[arg(long, conflicts_with = "resume")]
    start: Option<usize>,
    /// Row to stop before; defaults to the end of the source
    #[arg(long, conflicts_with = "count")]
    end: Option<usize>,
    /// Print this many rows from the start row
    #[arg(long)]
    count: Option<usize>,
    /// Start where the last recorded run for this source stopped
    #[arg(long)]
    resume: bool,
    /// Log labels instead of sending them to the printer
    #[arg(long)]
    simulate: bool,
    /// Serial device path
    #[arg(long)]
    device: Option<String>,
    /// Write the batch report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();

    let _guard = init_logger(&config.log_dir)
        .with_context(|| format!("cannot create log dir {}", config.log_dir.display()))?;

    if let Err(e) = run(cli.command, config) {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(command: Command, mut config: Config) -> anyhow::Result<()> {
    match command {
        Command::Split {
            input,
            chunk_size,
            output_dir,
        } => {
            let input = input.unwrap_or(config.input_file);
            let chunk_size = chunk_size.unwrap_or(config.rows_per_file);
            let output_dir = output_dir.unwrap_or(config.output_dir);

            let source = DatasetSource::load(&input)?;
            let chunks = split(&source, chunk_size)?;
            write_chunks(&chunks, &output_dir)?;
        }
        Command::Print(args) => {
            if args.simulate {
                config.simulate = true;
            }
            if let Some(device) = args.device.clone() {
                config.device = device;
            }
            print_range(args, &config)?;
        }
        Command::TestLabel { epc, qr, simulate } => {
            config.simulate |= simulate;
            let qr = qr.unwrap_or_else(|| epc.clone());
            let label = config.renderer().render(&epc, &qr);
            let delivery = config.transport()?.deliver(&label)?;
            tracing::info!(bytes = delivery.bytes, "Test label sent to {}", config.device);
        }
        Command::Progress => {
            let ledger = ProgressLedger::load(config.output_dir.join(LEDGER_FILE_NAME))?;
            let mut any = false;
            for (source, entry) in ledger.entries() {
                any = true;
                tracing::info!(
                    "{}: next row {} (printed {}, skipped {}, failed {}, updated {})",
                    source,
                    entry.next_row,
                    entry.printed,
                    entry.skipped,
                    entry.failed,
                    entry.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            if !any {
                tracing::info!("No progress recorded in {}", ledger.path().display());
            }
        }
    }
    Ok(())
}

fn print_range(args: PrintArgs, config: &Config) -> anyhow::Result<()> {
    let path = match (&args.source, args.chunk) {
        (Some(path), _) => path.clone(),
        (None, Some(n)) => config.output_dir.join(chunk_file_name(n)),
        (None, None) => anyhow::bail!("either --source or --chunk is required"),
    };
    let key = source_key(&path, &config.output_dir);

    let mut ledger = ProgressLedger::load(config.output_dir.join(LEDGER_FILE_NAME))?;
    let range = ledger.resolve_range(
        &key,
        &RangeRequest {
            start: args.start,
            end: args.end,
            count: args.count,
            resume: args.resume,
        },
    )?;

    let source = DatasetSource::load(&path)?;
    let transport = config.transport()?;
    let processor = BatchProcessor::new(config.validator(), config.renderer());

    tracing::info!(
        source = %path.display(),
        simulate = transport.is_simulated(),
        "Printing labels"
    );
    let report = processor.process(&source, range, &transport)?;

    let failed = report.failed_rows();
    if !failed.is_empty() {
        tracing::warn!("Rows to re-send: {:?}", failed);
    }

    finish_run(
        &mut ledger,
        &key,
        &report,
        transport.is_simulated(),
        args.report.as_deref(),
    )
}

/// Persist the outcome of a run: ledger first, then the optional JSON report
///
/// The labels are already on the stock, so the cursor is saved before
/// anything else can fail.
fn finish_run(
    ledger: &mut ProgressLedger,
    key: &str,
    report: &BatchReport,
    simulated: bool,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    if simulated {
        tracing::info!("Simulation: progress not recorded");
    } else {
        ledger.record(key, report);
        ledger.save()?;
        tracing::info!("{}: next row {}", key, ledger.next_row(key));
    }

    if let Some(report_path) = report_path {
        std::fs::write(report_path, serde_json::to_vec_pretty(report)?)
            .with_context(|| format!("cannot write report {}", report_path.display()))?;
    }
    Ok(())
}
