use std::time::Duration;

use opcline_frame::FrameDecoder;
use opcline_transport::{InstrumentStream, LineReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, transport_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_record, print_records_table, print_stats, OutputFormat};

const STDIN_LINE_WAIT: Duration = Duration::from_secs(1);

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    // A capture on disk is complete; piped stdin may still be arriving.
    let (stream, line_wait) = match &args.path {
        Some(path) => (
            InstrumentStream::open_file(path).map_err(|err| transport_error("open failed", err))?,
            Duration::ZERO,
        ),
        None => (InstrumentStream::stdin(), STDIN_LINE_WAIT),
    };
    let config = args.frame.to_config(line_wait)?;

    let mut decoder = FrameDecoder::with_config(LineReader::new(stream), config);
    let mut table_rows = Vec::new();

    while !decoder.is_exhausted() {
        let record = match decoder.decode() {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(err) if err.is_recoverable() => continue,
            Err(err) => return Err(frame_error("read failed", err)),
        };

        let seq = decoder.stats().frames_decoded;
        match format {
            OutputFormat::Table => table_rows.push((seq, record)),
            _ => print_record(&record, seq, format),
        }
    }

    if !table_rows.is_empty() {
        print_records_table(&table_rows);
    }
    print_stats(decoder.stats(), format);

    if decoder.stats().frames_decoded == 0 {
        tracing::warn!("no valid frame found");
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}
