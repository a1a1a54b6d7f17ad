use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use opcline_frame::{FrameConfig, DEFAULT_MAX_FIELDS};
use opcline_transport::InstrumentStream;

use crate::exit::{transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod listen;
pub mod ports;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames continuously and print each record.
    Listen(ListenArgs),
    /// Decode a capture to EOF and print records plus statistics.
    Decode(DecodeArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Survivor fields every frame must carry (31 or 34 for known variants).
    #[arg(long, env = "OPCLINE_FIELDS")]
    pub fields: Option<usize>,
    /// Hard limit on survivor fields per frame.
    #[arg(long, default_value_t = DEFAULT_MAX_FIELDS)]
    pub max_fields: usize,
}

impl FrameArgs {
    pub fn to_config(&self, line_wait: Duration) -> CliResult<FrameConfig> {
        if self.max_fields == 0 {
            return Err(CliError::new(USAGE, "--max-fields must be greater than zero"));
        }
        if let Some(fields) = self.fields {
            if fields > self.max_fields {
                return Err(CliError::new(
                    USAGE,
                    format!("--fields {fields} exceeds --max-fields {}", self.max_fields),
                ));
            }
        }
        Ok(FrameConfig {
            expected_fields: self.fields,
            max_fields: self.max_fields,
            line_wait,
            ..FrameConfig::default()
        })
    }
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Serial port wired to the instrument.
    #[arg(long, env = "OPCLINE_SERIAL", conflicts_with = "file")]
    pub serial: Option<String>,
    /// Serial baud rate.
    #[arg(long, default_value_t = 9600)]
    pub baud: u32,
    /// Serial read timeout (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub read_timeout: String,
    /// Capture file to replay. Default: stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl SourceArgs {
    pub fn open(&self) -> CliResult<InstrumentStream> {
        if let Some(port) = &self.serial {
            let timeout = parse_duration(&self.read_timeout)?;
            return open_serial(port, self.baud, timeout);
        }
        match &self.file {
            Some(path) => {
                InstrumentStream::open_file(path).map_err(|err| transport_error("open failed", err))
            }
            None => Ok(InstrumentStream::stdin()),
        }
    }
}

#[cfg(feature = "serial")]
fn open_serial(port: &str, baud: u32, timeout: Duration) -> CliResult<InstrumentStream> {
    opcline_transport::open_serial(port, baud, timeout)
        .map_err(|err| transport_error("serial open failed", err))
}

#[cfg(not(feature = "serial"))]
fn open_serial(_port: &str, _baud: u32, _timeout: Duration) -> CliResult<InstrumentStream> {
    Err(CliError::new(
        USAGE,
        "serial support not compiled in (rebuild with --features serial)",
    ))
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub frame: FrameArgs,
    /// How long to wait for the rest of a frame once it has opened.
    #[arg(long, default_value = "1s")]
    pub line_wait: String,
    /// Exit after printing N records.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode. Default: stdin.
    pub path: Option<PathBuf>,
    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `150ms`, `2s` or a bare number of seconds. Zero is allowed.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn frame_args_build_config() {
        let args = FrameArgs {
            fields: Some(34),
            max_fields: 100,
        };
        let config = args.to_config(Duration::from_millis(500)).unwrap();
        assert_eq!(config.expected_fields, Some(34));
        assert_eq!(config.line_wait, Duration::from_millis(500));
    }

    #[test]
    fn frame_args_reject_impossible_counts() {
        let args = FrameArgs {
            fields: Some(50),
            max_fields: 40,
        };
        assert_eq!(args.to_config(Duration::ZERO).unwrap_err().code, USAGE);

        let args = FrameArgs {
            fields: None,
            max_fields: 0,
        };
        assert!(args.to_config(Duration::ZERO).is_err());
    }
}
