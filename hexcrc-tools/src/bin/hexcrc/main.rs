mod config;
mod error;
mod util;

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;
use hexcrc::{ChecksumOptions, HexError, Image};

use crate::config::{load_config, Config};
use crate::error::{CliError, ExitStatus};
use crate::util::logging::{setup_logging, LevelFilter};
use crate::util::{hex_path, parse_u16, parse_u32};

#[derive(clap::Parser, Debug)]
#[clap(
    name = "hexcrc",
    about = "Calculates the CRC-32 of an Intel HEX firmware image and optionally writes it into the image",
    version
)]
struct Cli {
    /// Input file. The .hex extension is added if the name has none.
    #[arg(short, long, value_name = "NAME")]
    input: Option<PathBuf>,

    /// Output file. Defaults to the input file.
    #[arg(short, long, value_name = "NAME")]
    output: Option<PathBuf>,

    /// Store the CRC in the last four bytes of the image and write the image back out.
    #[arg(short, long)]
    write: bool,

    /// Fill value for gaps and padding, decimal or 0x-prefixed hex. Only the low byte is used.
    #[arg(short, long, value_name = "FILL")]
    fill: Option<String>,

    /// CRC-32 polynomial, decimal or 0x-prefixed hex.
    #[arg(short, long, value_name = "POLY")]
    polynomial: Option<String>,

    /// Level of the messages written to stderr. Overrides RUST_LOG.
    #[arg(long, value_enum, help_heading = "LOG CONFIGURATION")]
    log_level: Option<LevelFilter>,

    #[arg(hide = true)]
    extra: Vec<String>,
}

fn main() {
    std::process::exit(run(std::env::args_os().collect()).code());
}

fn run(args: Vec<OsString>) -> ExitStatus {
    if args.len() <= 1 {
        eprintln!("No parameters, see --help for usage.");
        return ExitStatus::NoParameters;
    }

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(error) => return usage_error(error),
    };

    let config = load_config();
    let log_level = cli
        .log_level
        .or_else(|| config.as_ref().ok().and_then(|config| config.log_level));
    if let Err(error) = setup_logging(log_level) {
        eprintln!("Failed to set up logging: {error}");
    }
    let config = config.unwrap_or_else(|error| {
        tracing::warn!("Ignoring the configuration file: {error:#}");
        Config::default()
    });

    for extra in &cli.extra {
        tracing::warn!("Ignoring extra parameter '{extra}'");
    }

    match cli.execute(&config) {
        Ok(()) => {
            println!("Done");
            ExitStatus::Success
        }
        Err(error) => {
            eprintln!("{} {error}", "Error:".red().bold());
            if let CliError::Hex(HexError::Format { text, .. }) = &error {
                eprintln!("\t{text}");
            }
            ExitStatus::from(&error)
        }
    }
}

fn usage_error(error: clap::Error) -> ExitStatus {
    let status = match error.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ExitStatus::Success,
        ErrorKind::UnknownArgument => ExitStatus::UnknownFlag,
        _ => ExitStatus::NoParameters,
    };

    if let Err(print_error) = error.print() {
        eprintln!("{print_error}");
    }

    status
}

impl Cli {
    fn execute(self, config: &Config) -> Result<(), CliError> {
        let options = self.checksum_options(config);

        let input = hex_path(self.input.as_deref().ok_or(CliError::NoInputFile)?)?;
        let output = match &self.output {
            Some(output) => hex_path(output)?,
            None => input.clone(),
        };

        let file = File::open(&input).map_err(|source| CliError::Open {
            path: input.display().to_string(),
            source,
        })?;
        let mut image = hexcrc::load_hex(BufReader::new(file), &options)?;
        tracing::info!(
            "Read {} bytes starting at {} from {}",
            image.len(),
            image.origin(),
            input.display()
        );

        let checksum = image.apply_checksum(options.polynomial);
        println!("CRC = {checksum}");

        if self.write {
            write_image(&image, &output)?;
        }

        Ok(())
    }

    /// Applies `--fill` and `--polynomial` on top of the configuration.
    ///
    /// Values that do not parse are reported and the configured value is kept.
    fn checksum_options(&self, config: &Config) -> ChecksumOptions {
        let mut options = config.checksum;

        if let Some(fill) = &self.fill {
            match parse_u16(fill) {
                Ok(fill) => {
                    tracing::info!("Using custom fill value: {fill:#06X}");
                    options.fill = fill;
                }
                Err(error) => tracing::warn!(
                    "Fill value '{fill}' is not valid ({error}), using {:#06X}",
                    options.fill
                ),
            }
        }

        if let Some(polynomial) = &self.polynomial {
            match parse_u32(polynomial) {
                Ok(polynomial) => {
                    tracing::info!("Using custom polynomial: {polynomial:#010X}");
                    options.polynomial = polynomial;
                }
                Err(error) => tracing::warn!(
                    "Polynomial '{polynomial}' is not valid ({error}), using {:#010X}",
                    options.polynomial
                ),
            }
        }

        options
    }
}

fn write_image(image: &Image, path: &Path) -> Result<(), CliError> {
    let write_error = |source| CliError::Write {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(write_error)?;
    image.write_hex(BufWriter::new(file)).map_err(write_error)?;
    tracing::info!("Wrote {}", path.display());

    Ok(())
}
