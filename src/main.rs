//! CLI entry point for `mimesplit`.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use mimesplit::config::Config;
use mimesplit::export::destination::prepare_destination;
use mimesplit::parser::source::read_message;
use mimesplit::split::split_message;

/// Separate MIME multi-part text into its body text and the attached files.
///
/// The decoded body text is written to STDOUT. The attached files are
/// restored into the destination directory.
#[derive(Parser)]
#[command(name = "mimesplit", version)]
struct Cli {
    /// Input message file. If omitted, the message is read from STDIN
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Destination directory of the attached files, created if it does not exist
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", value_enum, exclusive = true)]
    completions: Option<clap_complete::Shell>,

    /// Print a man page and exit
    #[arg(long, exclusive = true)]
    manpage: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        return cmd_completions(shell);
    }
    if cli.manpage {
        return cmd_manpage();
    }

    let config = mimesplit::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    cmd_split(&cli, &config)
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = mimesplit::config::cache_dir(config);
    if config.general.log_file && std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mimesplit.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Split the input message: body to stdout, attachments into the destination.
fn cmd_split(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let directory = cli
        .directory
        .as_deref()
        .or(config.output.directory.as_deref());
    let destination = prepare_destination(directory, config.output.create_parents)?;

    let raw = read_message(cli.file.as_deref())?;
    let options = config.split_options();

    let report = split_message(
        &raw,
        &destination,
        &options,
        std::io::stdout(),
        std::io::stderr(),
    )?;

    tracing::debug!(
        destination = %destination.display(),
        attachments = report.attachments.len(),
        "Done"
    );
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mimesplit", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
