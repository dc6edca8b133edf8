use super::{min_and_max, SpeedLog};
use chrono::prelude::*;
use std::fmt;

/// mean, max and min of one speed series, in Mbps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl SeriesStats {
    pub fn compute(v: &[f64]) -> Option<SeriesStats> {
        let (min, max) = min_and_max(v)?;
        let mean = v.iter().sum::<f64>() / v.len() as f64;
        Some(SeriesStats { mean, max, min })
    }
}

/// Summary of a whole speed log.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedStats {
    pub count: usize,
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
    pub download: SeriesStats,
    pub upload: SeriesStats,
}

impl SpeedStats {
    /// None for an empty log
    pub fn compute(speed_log: &SpeedLog) -> Option<SpeedStats> {
        let (first, last) = speed_log.time_bounds()?;
        let download: Vec<f64> = speed_log.download_mbps().collect();
        let upload: Vec<f64> = speed_log.upload_mbps().collect();
        Some(SpeedStats {
            count: speed_log.len(),
            first,
            last,
            download: SeriesStats::compute(&download)?,
            upload: SeriesStats::compute(&upload)?,
        })
    }

    pub fn span(&self) -> chrono::Duration {
        self.last - self.first
    }
}

impl fmt::Display for SpeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics:")?;
        writeln!(f, "Period: {} to {}", self.first, self.last)?;
        writeln!(f, "Measurements: {}", self.count)?;
        writeln!(f, "Mean download speed: {:.2} Mbps", self.download.mean)?;
        writeln!(f, "Mean upload speed: {:.2} Mbps", self.upload.mean)?;
        writeln!(f, "Max download speed: {:.2} Mbps", self.download.max)?;
        writeln!(f, "Max upload speed: {:.2} Mbps", self.upload.max)?;
        writeln!(f, "Min download speed: {:.2} Mbps", self.download.min)?;
        write!(f, "Min upload speed: {:.2} Mbps", self.upload.min)
    }
}
