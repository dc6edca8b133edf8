use chrono::prelude::*;
use std::io::Write;
use std::path::PathBuf;
pub mod chart;
pub mod cli;
pub mod console;
pub mod error;
pub mod parse;
pub mod stats;
pub mod visualize;

use error::RenderError;
use visualize::Visualization;

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// bits per second in one megabit per second (decimal mega, not mebi)
pub const BPS_PER_MBPS: f64 = 1_000_000.;

pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_DOWNLOAD: &str = "Download";
pub const COL_UPLOAD: &str = "Upload";

pub const LOG_FILENAME: &str = "internet_speed.log";
pub const REPORTS_DIRNAME: &str = "reports";
pub const CHART_FILENAME: &str = "network_speed_over_time.png";

/// One timestamped speed test sample, throughput in bits per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub timestamp: NaiveDateTime,
    pub download_bps: f64,
    pub upload_bps: f64,
}

impl Measurement {
    pub fn new(timestamp: NaiveDateTime, download_bps: f64, upload_bps: f64) -> Measurement {
        Measurement {
            timestamp,
            download_bps,
            upload_bps,
        }
    }

    pub fn download_mbps(&self) -> f64 {
        self.download_bps / BPS_PER_MBPS
    }

    pub fn upload_mbps(&self) -> f64 {
        self.upload_bps / BPS_PER_MBPS
    }
}

/// The main struct for the speed time series, in log order.
/// Read-only once built; the parser is the only producer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedLog {
    records: Vec<Measurement>,
}

impl SpeedLog {
    pub fn new(records: Vec<Measurement>) -> SpeedLog {
        SpeedLog { records }
    }

    pub fn records(&self) -> &[Measurement] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.records.iter().map(|m| m.timestamp)
    }

    pub fn download_mbps(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(Measurement::download_mbps)
    }

    pub fn upload_mbps(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(Measurement::upload_mbps)
    }

    /// earliest and latest timestamp, None for an empty log
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let time: Vec<NaiveDateTime> = self.timestamps().collect();
        min_and_max(&time[..])
    }

    /// min and max over both series together, in Mbps
    pub fn speed_bounds(&self) -> Option<(f64, f64)> {
        let speeds: Vec<f64> = self.download_mbps().chain(self.upload_mbps()).collect();
        min_and_max(&speeds[..])
    }
}

/// Explicit paths for one report run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub log_path: PathBuf,
    /// where the chart image goes, no image is saved when None
    pub output_dir: Option<PathBuf>,
}

impl ReportConfig {
    /// paths following the project layout: `<root>/internet_speed.log` and `<root>/reports`
    pub fn from_root(root: PathBuf) -> ReportConfig {
        ReportConfig {
            log_path: root.join(LOG_FILENAME),
            output_dir: Some(root.join(REPORTS_DIRNAME)),
        }
    }
}

/// Echoes the paths, makes sure the output directory exists, parses the log
/// and hands the result to the visualizer.
/// Parse failures are reported and end up as a no-data run; render failures are returned.
pub fn run_report<R, W>(
    config: &ReportConfig,
    renderer: &mut R,
    console: &mut W,
) -> Result<Visualization, RenderError>
where
    R: chart::ChartRenderer,
    W: Write,
{
    writeln!(console, "log file: {}", config.log_path.display())?;
    if let Some(dir) = &config.output_dir {
        writeln!(console, "output directory: {}", dir.display())?;
        std::fs::create_dir_all(dir).map_err(|e| RenderError::OutputDir {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    let speed_log = parse::load_speed_log(&config.log_path, console)?;
    visualize::visualize(
        speed_log.as_ref(),
        config.output_dir.as_deref(),
        renderer,
        console,
    )
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let mut self_iter = s.iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}

/// tick label format for the time axis, always date and time
pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    let xfmt = if d > chrono::Duration::weeks(1) {
        "%Y-%m-%d %H:%M"
    } else if d > chrono::Duration::hours(1) {
        "%m-%d %H:%M"
    } else {
        "%m-%d %H:%M:%S"
    };
    return xfmt;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn mbps_is_bps_over_one_million() {
        let m = Measurement::new(dt("2024-01-01 00:00:00"), 123_456_789., 1_000_000.);
        assert_eq!(m.download_mbps(), 123.456789);
        assert_eq!(m.upload_mbps(), 1.);
    }

    #[test]
    fn speed_bounds_span_both_series() {
        let log = SpeedLog::new(vec![
            Measurement::new(dt("2024-01-01 00:00:00"), 100_000_000., 50_000_000.),
            Measurement::new(dt("2024-01-01 01:00:00"), 80_000_000., 40_000_000.),
        ]);
        assert_eq!(log.speed_bounds(), Some((40., 100.)));
        assert_eq!(
            log.time_bounds(),
            Some((dt("2024-01-01 00:00:00"), dt("2024-01-01 01:00:00")))
        );
    }

    #[test]
    fn empty_log_has_no_bounds() {
        let log = SpeedLog::default();
        assert!(log.is_empty());
        assert_eq!(log.speed_bounds(), None);
        assert_eq!(log.time_bounds(), None);
    }

    #[test]
    fn min_and_max_ignores_order() {
        assert_eq!(min_and_max(&[3, 1, 4, 1, 5][..]), Some((1, 5)));
        assert_eq!(min_and_max::<i32>(&[][..]), None);
    }

    #[test]
    fn xfmt_keeps_date_and_time() {
        assert_eq!(suitable_xfmt(chrono::Duration::minutes(30)), "%m-%d %H:%M:%S");
        assert_eq!(suitable_xfmt(chrono::Duration::days(2)), "%m-%d %H:%M");
        assert_eq!(suitable_xfmt(chrono::Duration::weeks(3)), "%Y-%m-%d %H:%M");
    }

    #[test]
    fn config_from_root_follows_project_layout() {
        let config = ReportConfig::from_root(PathBuf::from("/srv/speed"));
        assert_eq!(config.log_path, PathBuf::from("/srv/speed/internet_speed.log"));
        assert_eq!(config.output_dir, Some(PathBuf::from("/srv/speed/reports")));
    }
}
