use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use opcline_frame::{DecoderStats, OutputRecord};
use serde::Serialize;

pub const RECORD_SCHEMA: &str = "opcline.cli.v1.record";
pub const STATS_SCHEMA: &str = "opcline.cli.v1.decoder-stats";
pub const PORTS_SCHEMA: &str = "opcline.cli.v1.serial-ports";

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct RecordOutput<'a> {
    schema_id: &'a str,
    seq: u64,
    frame_id: String,
    fields: usize,
    values: &'a [i32],
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    schema_id: &'a str,
    #[serde(flatten)]
    stats: &'a DecoderStats,
    frames_dropped: u64,
}

/// Print one record as soon as it is published.
pub fn print_record(record: &OutputRecord, seq: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", record_json(record, seq));
        }
        OutputFormat::Table => print_records_table(&[(seq, record.clone())]),
        OutputFormat::Pretty => {
            println!(
                "#{seq} frame={} fields={} values=[{record}]",
                record.frame_id(),
                record.values().len()
            );
        }
        OutputFormat::Raw => println!("{record}"),
    }
}

pub fn print_records_table(records: &[(u64, OutputRecord)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["SEQ", "FRAME", "FIELDS", "VALUES"]);
    for (seq, record) in records {
        table.add_row(vec![
            seq.to_string(),
            record.frame_id().to_string(),
            record.values().len().to_string(),
            record.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn print_stats(stats: &DecoderStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatsOutput {
                schema_id: STATS_SCHEMA,
                stats,
                frames_dropped: stats.frames_dropped(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LINES", "DECODED", "SYNC", "INCOMPLETE", "REJECTED"])
                .add_row(vec![
                    stats.lines_read.to_string(),
                    stats.frames_decoded.to_string(),
                    stats.sync_errors.to_string(),
                    stats.incomplete.to_string(),
                    stats.rejected.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "lines={} decoded={} dropped={} (sync={} incomplete={} rejected={})",
                stats.lines_read,
                stats.frames_decoded,
                stats.frames_dropped(),
                stats.sync_errors,
                stats.incomplete,
                stats.rejected
            );
        }
        OutputFormat::Raw => {}
    }
}

fn record_json(record: &OutputRecord, seq: u64) -> String {
    let out = RecordOutput {
        schema_id: RECORD_SCHEMA,
        seq,
        frame_id: record.frame_id().to_string(),
        fields: record.values().len(),
        values: record.values(),
    };
    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_json_shape() {
        let record = OutputRecord::new('1', vec![1, 2, 3, 4, 5, 200, 9]);
        let value: serde_json::Value = serde_json::from_str(&record_json(&record, 3)).unwrap();

        assert_eq!(value["schema_id"], RECORD_SCHEMA);
        assert_eq!(value["seq"], 3);
        assert_eq!(value["frame_id"], "1");
        assert_eq!(value["fields"], 7);
        assert_eq!(value["values"], serde_json::json!([1, 2, 3, 4, 5, 200, 9]));
    }

    #[test]
    fn stats_json_is_flat() {
        let stats = DecoderStats {
            lines_read: 9,
            frames_decoded: 2,
            sync_errors: 1,
            ..DecoderStats::default()
        };
        let out = StatsOutput {
            schema_id: STATS_SCHEMA,
            stats: &stats,
            frames_dropped: stats.frames_dropped(),
        };
        let value = serde_json::to_value(&out).unwrap();

        assert_eq!(value["lines_read"], 9);
        assert_eq!(value["frames_decoded"], 2);
        assert_eq!(value["frames_dropped"], 1);
    }
}
