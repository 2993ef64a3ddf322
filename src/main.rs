use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod commands;
mod config;
mod errors;
mod extractor;
mod progress;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch video metadata and print it as JSON
    Info {
        url: String,
        /// Drop formats below this height; fails if none remain
        #[arg(long)]
        min_height: Option<u32>,
    },
    /// Download one format into a directory
    Download {
        url: String,
        output_dir: PathBuf,
        format_id: String,
    },
    /// Check whether a URL resolves to a downloadable video
    Validate { url: String },
    /// Verify that the extraction tooling is installed
    Check,
}

#[tokio::main]
async fn main() {
    // Usage errors exit 1 before anything touches the network
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(usage_exit_code(&err));
        }
    };

    // Logs go to stderr so stdout stays machine-parseable
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(1);
        }
    }
}

/// Requested help or version output is not a usage error.
fn usage_exit_code(err: &clap::Error) -> i32 {
    use clap::error::ErrorKind;

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Info { url, min_height } => commands::info(&config, &url, min_height).await,
        Command::Download {
            url,
            output_dir,
            format_id,
        } => commands::download(&config, &url, &output_dir, &format_id).await,
        Command::Validate { url } => commands::validate(&config, &url).await,
        Command::Check => commands::check(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_rejects_missing_download_arguments() {
        let err =
            Cli::try_parse_from(["vidgrab", "download", "https://example.com/v"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn help_and_version_exit_zero() {
        let err = Cli::try_parse_from(["vidgrab", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);

        let err = Cli::try_parse_from(["vidgrab", "--version"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
    }

    #[test]
    fn cli_rejects_extra_validate_arguments() {
        assert!(
            Cli::try_parse_from(["vidgrab", "validate", "https://a.com/v", "extra"]).is_err()
        );
    }

    #[test]
    fn cli_parses_info_with_min_height() {
        let cli = Cli::try_parse_from([
            "vidgrab",
            "info",
            "https://example.com/v",
            "--min-height",
            "720",
        ])
        .unwrap();
        match cli.command {
            Command::Info { url, min_height } => {
                assert_eq!(url, "https://example.com/v");
                assert_eq!(min_height, Some(720));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_parses_download_arguments_in_order() {
        let cli = Cli::try_parse_from([
            "vidgrab",
            "download",
            "https://example.com/v",
            "/tmp/out",
            "22",
        ])
        .unwrap();
        match cli.command {
            Command::Download {
                url,
                output_dir,
                format_id,
            } => {
                assert_eq!(url, "https://example.com/v");
                assert_eq!(output_dir, PathBuf::from("/tmp/out"));
                assert_eq!(format_id, "22");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
