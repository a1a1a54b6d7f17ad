use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use opcline_frame::{FrameDecoder, MeasurementRecord};
use opcline_transport::LineReader;

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::{print_record, print_stats, OutputFormat};

const IDLE_SLEEP: Duration = Duration::from_millis(20);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let line_wait = parse_duration(&args.line_wait)?;
    let config = args.frame.to_config(line_wait)?;
    let stream = args.source.open()?;
    tracing::info!(source = stream.kind(), fields = ?config.expected_fields, "listening");

    let mut decoder = FrameDecoder::with_config(LineReader::new(stream), config);
    let shared = MeasurementRecord::new();

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let lines_before = decoder.stats().lines_read;
        let published = decoder
            .poll(&shared)
            .map_err(|err| frame_error("read failed", err))?;

        if published {
            if let Some(record) = shared.take_new() {
                print_record(&record, shared.published(), format);
                printed = printed.saturating_add(1);
            }
            if args.count.is_some_and(|count| printed >= count) {
                break;
            }
            continue;
        }

        if decoder.is_exhausted() {
            tracing::info!("line source exhausted");
            break;
        }
        if decoder.stats().lines_read == lines_before {
            std::thread::sleep(IDLE_SLEEP);
        }
    }

    tracing::info!(
        decoded = decoder.stats().frames_decoded,
        dropped = decoder.stats().frames_dropped(),
        "listen finished"
    );
    if matches!(format, OutputFormat::Pretty) {
        print_stats(decoder.stats(), format);
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
