//! Telemetry log ingestion.
//!
//! Logs come from different loggers with different column names, so the
//! latitude, longitude and time columns are found by name fragments and the
//! time format is sniffed from the first row that carries a GPS fix.

use crate::coords::CoordinateConverter;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use csv::StringRecord;
use model::Sample;
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

/// One log row with a GPS fix: the untouched record plus the parsed sample.
#[derive(Clone, Debug)]
pub struct LogLine {
    pub record: StringRecord,
    pub sample: Sample,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimestampFormat {
    /// Plain milliseconds since logging started (RaceCapture `Interval`).
    IntervalMs { column: usize },
    /// ISO-8601 instants, reported relative to the first one seen.
    Iso8601 { column: usize, origin: DateTime<FixedOffset> },
}

impl TimestampFormat {
    fn detect(headers: &StringRecord, first: &StringRecord) -> Result<Self> {
        if let Ok(column) = find_column(headers, "interval") {
            if field(first, column).parse::<f64>().map_or(false, f64::is_finite) {
                return Ok(TimestampFormat::IntervalMs { column });
            }
        }
        if let Ok(column) = find_column(headers, "timestamp") {
            if let Ok(origin) = DateTime::parse_from_rfc3339(field(first, column)) {
                return Ok(TimestampFormat::Iso8601 { column, origin });
            }
        }
        bail!("cannot decode timestamp column (looked for `interval` ms or ISO-8601 `timestamp`)")
    }

    fn seconds(&self, record: &StringRecord) -> Result<f64> {
        match self {
            TimestampFormat::IntervalMs { column } => {
                let raw = field(record, *column);
                let ms: f64 = raw.parse().with_context(|| format!("bad interval `{}`", raw))?;
                if !ms.is_finite() {
                    bail!("interval `{}` is not a finite number", raw);
                }
                Ok(ms / 1000.0)
            }
            TimestampFormat::Iso8601 { column, origin } => {
                let raw = field(record, *column);
                let t = DateTime::parse_from_rfc3339(raw)
                    .with_context(|| format!("bad timestamp `{}`", raw))?;
                let d = t.signed_duration_since(*origin);
                let us = d.num_microseconds().ok_or_else(|| anyhow!("timestamp `{}` out of range", raw))?;
                Ok(us as f64 / 1e6)
            }
        }
    }
}

fn field(record: &StringRecord, column: usize) -> &str {
    record.get(column).unwrap_or("").trim()
}

/// Index of the single header containing `name`, case-insensitively.
pub fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    let needle = name.to_lowercase();
    let matches: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [i] => Ok(*i),
        [] => bail!("no column header contains `{}`", name),
        many => bail!("{} column headers contain `{}`", many.len(), name),
    }
}

pub struct LogReader<R, C> {
    rdr: csv::Reader<R>,
    headers: StringRecord,
    lat_col: usize,
    lon_col: usize,
    timestamp: Option<TimestampFormat>,
    converter: C,
}

impl<C: CoordinateConverter> LogReader<File, C> {
    pub fn open(path: &Path, converter: C) -> Result<Self> {
        let rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("open {}", path.display()))?;
        Self::new(rdr, converter).with_context(|| format!("read header of {}", path.display()))
    }
}

impl<R: Read, C: CoordinateConverter> LogReader<R, C> {
    pub fn from_reader(reader: R, converter: C) -> Result<Self> {
        let rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        Self::new(rdr, converter)
    }

    fn new(mut rdr: csv::Reader<R>, converter: C) -> Result<Self> {
        let headers = rdr.headers()?.clone();
        let lat_col = find_column(&headers, "lat")?;
        let lon_col = find_column(&headers, "lon")?;
        Ok(Self { rdr, headers, lat_col, lon_col, timestamp: None, converter })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn timestamp_format(&self) -> Option<&TimestampFormat> {
        self.timestamp.as_ref()
    }

    fn parse(&mut self, record: StringRecord) -> Result<Option<LogLine>> {
        let (lat, lon) = (field(&record, self.lat_col), field(&record, self.lon_col));
        if lat.is_empty() || lon.is_empty() {
            // another channel logged faster than GPS
            return Ok(None);
        }
        let lat: f64 = lat.parse().with_context(|| format!("bad latitude `{}`", lat))?;
        let lon: f64 = lon.parse().with_context(|| format!("bad longitude `{}`", lon))?;

        let format = match self.timestamp.take() {
            Some(f) => f,
            None => TimestampFormat::detect(&self.headers, &record)?,
        };
        let t_s = format.seconds(&record);
        self.timestamp = Some(format);
        let t_s = t_s?;

        Ok(Some(LogLine {
            sample: Sample { position: self.converter.to_local(lat, lon), t_s },
            record,
        }))
    }
}

impl<R: Read, C: CoordinateConverter> Iterator for LogReader<R, C> {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.rdr.read_record(&mut record) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(e) => return Some(Err(e.into())),
            }
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            match self.parse(record) {
                Ok(Some(l)) => return Some(Ok(l)),
                Ok(None) => debug!(line, "row without GPS fix skipped"),
                Err(e) => return Some(Err(e.context(format!("log line {}", line)))),
            }
        }
    }
}
