//! Replay a capture of instrument output and print every decoded record.
//!
//! Run with:
//!   cargo run --example replay -- capture.txt
//!
//! Without an argument, a short built-in capture is replayed.

use std::io::Cursor;

use opcline::frame::{FrameDecoder, MeasurementRecord};
use opcline::transport::{InstrumentStream, LineReader, LineSource};

const SAMPLE: &str = "\
c0;4 0
C1:1 2 3
C1;4 5
c1:100 200 160
c1;9 0
C2:1 2
D2;3 4
C3:7 8 9
C3;10
c3:9 11 160
c3;12 0
";

fn replay<S: LineSource>(source: S) -> Result<(), Box<dyn std::error::Error>> {
    let mut decoder = FrameDecoder::new(source);
    let shared = MeasurementRecord::new();

    while !decoder.is_exhausted() {
        if decoder.poll(&shared)? {
            if let Some(record) = shared.take_new() {
                println!("frame {}: {record}", record.frame_id());
            }
        }
    }

    let stats = decoder.stats();
    eprintln!(
        "{} frames decoded, {} dropped",
        stats.frames_decoded,
        stats.frames_dropped()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => replay(LineReader::new(InstrumentStream::open_file(path)?)),
        None => replay(LineReader::new(Cursor::new(SAMPLE.as_bytes()))),
    }
}
