use clap::Parser;
use field_detection::cli::commands::{cmd_batch, cmd_detect};
use field_detection::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Detect {
            source,
            format,
            threshold,
            diagnostic,
            trace,
            output,
        } => {
            let context = cmd_detect(
                &source,
                format.as_deref(),
                threshold,
                diagnostic,
                trace.as_deref(),
                output.as_deref(),
                cli.verbose,
                &config,
            )?;
            if context.error.is_some() {
                std::process::exit(1);
            }
        }
        Commands::Batch {
            dir,
            format,
            output,
        } => {
            let all_succeeded = cmd_batch(&dir, format.as_deref(), output.as_deref(), &config)?;
            if !all_succeeded {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise -v selects debug and -vv trace.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("field_detection={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
