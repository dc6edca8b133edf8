use super::error::ParseError;
use super::{Measurement, SpeedLog, COL_DOWNLOAD, COL_TIMESTAMP, COL_UPLOAD};
use chrono::prelude::*;
use log::{debug, error, info};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Write};
use std::path::Path;

/// Timestamp layouts accepted in the log, tried in this order on the first row.
/// The first one that fits is then required for every other row.
/// `%.f` also reads whole seconds, so rows may drop a zero fraction.
pub const TIMESTAMP_FORMATS: [TimestampFormat; 8] = [
    TimestampFormat::Naive("%Y-%m-%d %H:%M:%S%.f"),
    TimestampFormat::Naive("%Y-%m-%dT%H:%M:%S%.f"),
    TimestampFormat::Naive("%Y/%m/%d %H:%M:%S%.f"),
    TimestampFormat::Naive("%Y-%m-%d %H:%M"),
    TimestampFormat::Naive("%Y/%m/%d %H:%M"),
    TimestampFormat::Rfc3339,
    TimestampFormat::DateOnly("%Y-%m-%d"),
    TimestampFormat::DateOnly("%Y/%m/%d"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestampFormat {
    /// date and time without offset, taken as is
    Naive(&'static str),
    /// date and time with offset, normalized to UTC
    Rfc3339,
    /// date only, at midnight
    DateOnly(&'static str),
}

impl TimestampFormat {
    /// first format in [`TIMESTAMP_FORMATS`] able to read `s`
    pub fn detect(s: &str) -> Option<TimestampFormat> {
        TIMESTAMP_FORMATS
            .iter()
            .copied()
            .find(|f| f.parse(s).is_some())
    }

    pub fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        match self {
            TimestampFormat::Naive(fmt) => NaiveDateTime::parse_from_str(s, fmt).ok(),
            TimestampFormat::Rfc3339 => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_utc()),
            TimestampFormat::DateOnly(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }
}

impl SpeedLog {
    /// Init a SpeedLog from the csv log.
    /// All or nothing: any bad row fails the whole file.
    /// Does not check that the timestamps are ordered, the file order is kept as is.
    pub fn from_csv(fin: &Path) -> Result<SpeedLog, ParseError> {
        let path = fin.display().to_string();
        let file = File::open(fin).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ParseError::NotFound { path: path.clone() },
            _ => ParseError::Io {
                path: path.clone(),
                source: e,
            },
        })?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Fields)
            .from_reader(BufReader::new(file));

        let headers = rdr.headers()?.clone();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ParseError::Empty { path });
        }
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(ParseError::MissingColumn { column: name })
        };
        let i_time = column(COL_TIMESTAMP)?;
        let i_down = column(COL_DOWNLOAD)?;
        let i_up = column(COL_UPLOAD)?;

        let mut records: Vec<Measurement> = Vec::new();
        let mut format: Option<TimestampFormat> = None;
        for (n, row) in rdr.records().enumerate() {
            let row = row?;
            // header is line 1
            let line = row.position().map(|p| p.line()).unwrap_or(n as u64 + 2);
            let field = |i: usize| row.get(i).unwrap_or_default();

            let raw_time = field(i_time);
            let fmt = match format {
                Some(f) => f,
                None => {
                    let f = TimestampFormat::detect(raw_time).ok_or_else(|| {
                        ParseError::Timestamp {
                            line,
                            value: raw_time.to_string(),
                        }
                    })?;
                    debug!("detected timestamp format {:?} on line {}", f, line);
                    format = Some(f);
                    f
                }
            };
            let timestamp = fmt.parse(raw_time).ok_or_else(|| ParseError::Timestamp {
                line,
                value: raw_time.to_string(),
            })?;
            let download_bps = parse_throughput(field(i_down), COL_DOWNLOAD, line)?;
            let upload_bps = parse_throughput(field(i_up), COL_UPLOAD, line)?;
            records.push(Measurement::new(timestamp, download_bps, upload_bps));
        }
        info!("parsed {} measurements from {}", records.len(), path);
        Ok(SpeedLog::new(records))
    }
}

fn parse_throughput(s: &str, column: &'static str, line: u64) -> Result<f64, ParseError> {
    let value: f64 = s.parse().map_err(|_| ParseError::Number {
        line,
        column,
        value: s.to_string(),
    })?;
    if !value.is_finite() || value < 0. {
        return Err(ParseError::Throughput {
            line,
            column,
            value,
        });
    }
    Ok(value)
}

/// Parses the log, reporting any failure on `console` and returning None instead,
/// so that the caller only distinguishes data from no data.
/// Only a failed write to `console` is an error.
pub fn load_speed_log<W: Write>(fin: &Path, console: &mut W) -> io::Result<Option<SpeedLog>> {
    match SpeedLog::from_csv(fin) {
        Ok(speed_log) => Ok(Some(speed_log)),
        Err(e) => {
            error!("failed to parse the speed log {}: {}", fin.display(), e);
            writeln!(console, "could not parse {}: {}", fin.display(), e)?;
            Ok(None)
        }
    }
}
