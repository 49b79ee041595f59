//! Upstream ingest: dated string records → validated, ascending `PriceBar`s.
//!
//! The upstream daily series arrives as a JSON object keyed by date, with
//! every number encoded as a string and the newest day usually first. The
//! object entries are kept in document order so repeated dates can be
//! detected instead of being silently collapsed by a map.

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::domain::bar::check_ascending;
use crate::domain::PriceBar;
use crate::error::InputError;

/// Date format of upstream keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One upstream daily record with numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDailyEntry {
    #[serde(rename = "1. open", alias = "open")]
    pub open: String,
    #[serde(rename = "2. high", alias = "high")]
    pub high: String,
    #[serde(rename = "3. low", alias = "low")]
    pub low: String,
    #[serde(rename = "4. close", alias = "close")]
    pub close: String,
    #[serde(rename = "5. volume", alias = "volume")]
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PayloadMeta {
    #[serde(rename = "2. Symbol", alias = "symbol", default)]
    pub symbol: Option<String>,
}

/// A whole daily-series payload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DailySeriesPayload {
    #[serde(rename = "Meta Data", default)]
    pub meta: Option<PayloadMeta>,
    #[serde(rename = "Error Message", default)]
    pub error_message: Option<String>,
    #[serde(
        rename = "Time Series (Daily)",
        default,
        deserialize_with = "ordered_entries"
    )]
    pub series: Vec<(String, RawDailyEntry)>,
}

impl DailySeriesPayload {
    pub fn symbol(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.symbol.as_deref())
    }
}

fn ordered_entries<'de, D>(deserializer: D) -> Result<Vec<(String, RawDailyEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, RawDailyEntry)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object of date → daily entry")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((date, entry)) = map.next_entry::<String, RawDailyEntry>()? {
                entries.push((date, entry));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| InputError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_number(date: NaiveDate, field: &'static str, value: &str) -> Result<f64, InputError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| InputError::InvalidNumber {
            date,
            field,
            value: value.to_string(),
        })
}

impl RawDailyEntry {
    pub fn to_bar(&self, date: NaiveDate) -> Result<PriceBar, InputError> {
        let bar = PriceBar {
            date,
            open: parse_number(date, "open", &self.open)?,
            high: parse_number(date, "high", &self.high)?,
            low: parse_number(date, "low", &self.low)?,
            close: parse_number(date, "close", &self.close)?,
            volume: parse_number(date, "volume", &self.volume)?,
        };
        if bar.is_sane() {
            Ok(bar)
        } else {
            Err(InputError::InvalidBar(date))
        }
    }
}

/// Parse, validate and sort upstream entries.
///
/// Entries may arrive in any order; the result is ascending by date.
/// A date that occurs twice is an input error.
pub fn ingest_entries<S: AsRef<str>>(
    entries: &[(S, RawDailyEntry)],
) -> Result<Vec<PriceBar>, InputError> {
    if entries.is_empty() {
        return Err(InputError::EmptySeries);
    }
    let mut bars = entries
        .iter()
        .map(|(date, entry)| entry.to_bar(parse_date(date.as_ref())?))
        .collect::<Result<Vec<_>, _>>()?;
    sort_bars(&mut bars)?;
    Ok(bars)
}

/// Sort bars ascending by date and reject duplicates.
pub fn sort_bars(bars: &mut [PriceBar]) -> Result<(), InputError> {
    bars.sort_by_key(|b| b.date);
    check_ascending(bars)
}

/// Parse a JSON daily-series payload into bars.
pub fn ingest_payload(payload: &DailySeriesPayload) -> Result<Vec<PriceBar>, InputError> {
    ingest_entries(&payload.series)
}
