use anyhow::{bail, Result};
use clap::Parser;
use noteml_config::{Config, ConfigArgs, SystemCpuInfo};
use noteml_data_provider::{DummyNoteReader, LocalNoteReader, NoteReader};
use noteml_logging::init_logging;
use noteml_runner::{DummyRunner, EpochController, RunOutcome};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[clap(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
enum Commands {
    // Prints the help, optionally as markdown. Used for docs generation.
    #[clap(hide = true)]
    PrintAllHelp {
        #[arg(long, required = true)]
        markdown: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(Commands::PrintAllHelp { markdown }) = args.command {
        if !markdown {
            bail!("print-all-help only supports --markdown");
        }
        let () = clap_markdown::print_help_markdown::<Args>();
        return Ok(());
    }

    let options = args.config;
    init_logging(options.log_output, Level::INFO, options.write_log.clone())?;

    let config = Config::from_args(options, &SystemCpuInfo, true)?;
    match config.options.data_storage.as_str() {
        "jsonl" => train(&config, LocalNoteReader::from_config(&config)?),
        "dummy" => train(&config, DummyNoteReader::from_config(&config)?),
        other => bail!("unknown data storage {other:?}, expected \"jsonl\" or \"dummy\""),
    }
}

fn train<D: NoteReader>(config: &Config, reader: D) -> Result<()> {
    let runner = match config.options.runner.as_deref() {
        None | Some("") | Some("dummy") => DummyRunner::new(config),
        Some(other) => bail!("unknown runner {other:?}"),
    };
    match EpochController::new(config, runner, reader).run(true)? {
        RunOutcome::Visualized => info!("Visualizations done."),
        RunOutcome::Trained(summary) => info!(
            epochs = summary.epochs_run,
            global_step = summary.global_step,
            stop_reason = ?summary.stop_reason,
            "Training finished"
        ),
    }
    Ok(())
}
