//! orduniq: order-preserving line deduplication
//!
//! Usage: orduniq [OPTIONS] [FILE]...

use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use orduniq::streaming::buffers::{DEFAULT_INPUT_BUFFER, DEFAULT_OUTPUT_BUFFER};
use orduniq::{resolve_inputs, DedupCommand, DedupConfig, DedupError, FlushInterval};

#[derive(Parser)]
#[command(name = "orduniq")]
#[command(version)]
#[command(about = "Print each distinct input line once, in first-seen order", long_about = None)]
struct Cli {
    /// Output buffer size in bytes
    #[arg(
        short = 'o',
        long = "output-buffer",
        value_name = "BYTES",
        default_value_t = DEFAULT_OUTPUT_BUFFER
    )]
    output_buffer: usize,

    /// Input buffer size in bytes
    #[arg(
        short = 'i',
        long = "input-buffer",
        value_name = "BYTES",
        default_value_t = DEFAULT_INPUT_BUFFER
    )]
    input_buffer: usize,

    /// Flush output every INTERVAL (e.g. 1s, 250ms, 1m30s); 0 or negative disables
    #[arg(
        short = 'f',
        long = "flush-every",
        value_name = "INTERVAL",
        default_value = "1s",
        allow_hyphen_values = true
    )]
    flush_every: FlushInterval,

    /// Add a newline to a final line that lacks one
    #[arg(short = 't', long)]
    terminate_final_line: bool,

    /// Print dedup statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Input files (use - for stdin; stdin if none given)
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("orduniq: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "orduniq: {}: {}",
                record.level().as_str().to_lowercase(),
                record.args()
            )
        })
        .init();
}

fn run(cli: Cli) -> Result<(), DedupError> {
    let sources = resolve_inputs(&cli.files)?;

    let config = DedupConfig::new()
        .with_output_buffer(cli.output_buffer)
        .with_input_buffer(cli.input_buffer)
        .with_flush_interval(cli.flush_every)
        .with_terminate_final_line(cli.terminate_final_line);

    let cmd = DedupCommand::new(config);
    let stats = cmd.run_stdout(sources)?;

    if cli.stats {
        eprintln!("Dedup stats: {}", stats);
    }

    Ok(())
}
