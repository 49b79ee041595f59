//! Upstream data ingest and validation

pub mod ingest;

pub use ingest::{
    ingest_entries, ingest_payload, parse_date, sort_bars, DailySeriesPayload, PayloadMeta,
    RawDailyEntry, DATE_FORMAT,
};
