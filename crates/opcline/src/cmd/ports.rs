use serde::Serialize;

use crate::cmd::PortsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{OutputFormat, PORTS_SCHEMA};

#[derive(Serialize)]
struct PortsOutput {
    schema_id: &'static str,
    ports: Vec<String>,
}

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let out = PortsOutput {
        schema_id: PORTS_SCHEMA,
        ports: list_ports()?,
    };
    print_ports(&out, format);
    Ok(SUCCESS)
}

#[cfg(feature = "serial")]
fn list_ports() -> CliResult<Vec<String>> {
    opcline_transport::available_ports()
        .map_err(|err| crate::exit::transport_error("listing serial ports failed", err))
}

#[cfg(not(feature = "serial"))]
fn list_ports() -> CliResult<Vec<String>> {
    Err(crate::exit::CliError::new(
        crate::exit::USAGE,
        "serial support not compiled in (rebuild with --features serial)",
    ))
}

fn print_ports(out: &PortsOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            if out.ports.is_empty() {
                println!("No serial ports found.");
                return;
            }
            println!("Serial ports:");
            for port in &out.ports {
                println!("  {port}");
            }
        }
        OutputFormat::Raw => {
            for port in &out.ports {
                println!("{port}");
            }
        }
    }
}
