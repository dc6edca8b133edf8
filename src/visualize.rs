use super::chart::{ChartLayout, ChartRenderer};
use super::error::RenderError;
use super::stats::SpeedStats;
use super::{SpeedLog, CHART_FILENAME};
use log::{info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const NO_DATA_MESSAGE: &str = "no data to visualize, skipping the chart";

/// How a visualization run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    /// nothing to draw, only the no-data line was printed
    NoData,
    Rendered {
        saved: Option<PathBuf>,
        stats: SpeedStats,
    },
}

/// Draws the speed log (saving it when `output_dir` is given, then showing it)
/// and prints the statistics to `console`.
/// A missing or empty log prints one line and draws nothing.
pub fn visualize<R, W>(
    speed_log: Option<&SpeedLog>,
    output_dir: Option<&Path>,
    renderer: &mut R,
    console: &mut W,
) -> Result<Visualization, RenderError>
where
    R: ChartRenderer,
    W: Write,
{
    // layout and stats exist exactly for non-empty logs
    let prepared = speed_log
        .and_then(|s| Some((s, ChartLayout::for_log(s)?, SpeedStats::compute(s)?)));
    let (speed_log, layout, stats) = match prepared {
        Some(p) => p,
        None => {
            warn!("nothing to visualize");
            writeln!(console, "{}", NO_DATA_MESSAGE)?;
            return Ok(Visualization::NoData);
        }
    };
    info!(
        "visualizing {} measurements, annotations {}",
        speed_log.len(),
        if layout.annotate { "on" } else { "off" }
    );

    let saved = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| RenderError::OutputDir {
                path: dir.display().to_string(),
                source: e,
            })?;
            let fout = dir.join(CHART_FILENAME);
            renderer.save(speed_log, &layout, &fout)?;
            writeln!(console, "saved chart to {}", fout.display())?;
            Some(fout)
        }
        None => None,
    };
    renderer.show(speed_log, &layout)?;

    writeln!(console)?;
    writeln!(console, "{}", stats)?;
    Ok(Visualization::Rendered { saved, stats })
}
