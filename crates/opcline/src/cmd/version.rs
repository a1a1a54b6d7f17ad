use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("opcline {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: opcline");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("OPCLINE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("features: serial={}, cli=true", cfg!(feature = "serial"));
    println!(
        "frame: compact={} extended={} max_fields={}",
        opcline_frame::FIELDS_COMPACT,
        opcline_frame::FIELDS_EXTENDED,
        opcline_frame::DEFAULT_MAX_FIELDS
    );

    Ok(SUCCESS)
}
