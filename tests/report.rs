use speedtest_analyzer::chart::{ChartLayout, ChartRenderer, PlottersRenderer, DEFAULT_DPI};
use speedtest_analyzer::error::RenderError;
use speedtest_analyzer::visualize::{Visualization, NO_DATA_MESSAGE};
use speedtest_analyzer::{run_report, ReportConfig, SpeedLog};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Default)]
struct CountingRenderer {
    saves: Vec<PathBuf>,
    shows: usize,
}

impl ChartRenderer for CountingRenderer {
    fn save(
        &mut self,
        _speed_log: &SpeedLog,
        _layout: &ChartLayout,
        path: &Path,
    ) -> Result<(), RenderError> {
        self.saves.push(path.to_path_buf());
        Ok(())
    }

    fn show(&mut self, _speed_log: &SpeedLog, _layout: &ChartLayout) -> Result<(), RenderError> {
        self.shows += 1;
        Ok(())
    }
}

fn project(log: Option<&str>) -> (TempDir, ReportConfig) {
    let root = tempfile::tempdir().unwrap();
    if let Some(content) = log {
        fs::write(root.path().join("internet_speed.log"), content).unwrap();
    }
    let config = ReportConfig::from_root(root.path().to_path_buf());
    (root, config)
}

fn report(config: &ReportConfig, renderer: &mut CountingRenderer) -> (Visualization, String) {
    let mut console: Vec<u8> = Vec::new();
    let out = run_report(config, renderer, &mut console).unwrap();
    (out, String::from_utf8(console).unwrap())
}

#[test]
fn two_measurements_are_charted_and_summarized() {
    let (root, config) = project(Some(
        "Timestamp,Download,Upload\n\
         2024-01-01 00:00:00,100000000,50000000\n\
         2024-01-01 01:00:00,80000000,40000000\n",
    ));
    let mut renderer = CountingRenderer::default();
    let (out, text) = report(&config, &mut renderer);

    let chart = root.path().join("reports").join("network_speed_over_time.png");
    assert_eq!(renderer.saves, vec![chart.clone()]);
    assert_eq!(renderer.shows, 1);
    assert!(text.starts_with(&format!(
        "log file: {}\n",
        root.path().join("internet_speed.log").display()
    )));
    assert!(text.contains(&format!("saved chart to {}", chart.display())));
    for line in [
        "Measurements: 2",
        "Period: 2024-01-01 00:00:00 to 2024-01-01 01:00:00",
        "Mean download speed: 90.00 Mbps",
        "Max download speed: 100.00 Mbps",
        "Min download speed: 80.00 Mbps",
        "Mean upload speed: 45.00 Mbps",
        "Max upload speed: 50.00 Mbps",
        "Min upload speed: 40.00 Mbps",
    ]
    .iter()
    {
        assert!(text.contains(line), "missing `{}` in\n{}", line, text);
    }
    match out {
        Visualization::Rendered { stats, .. } => assert_eq!(stats.count, 2),
        Visualization::NoData => panic!("expected a chart"),
    }
}

#[test]
fn header_only_log_is_a_clean_no_op() {
    let (_root, config) = project(Some("Timestamp,Download,Upload\n"));
    let mut renderer = CountingRenderer::default();
    let (out, text) = report(&config, &mut renderer);
    assert_eq!(out, Visualization::NoData);
    assert!(renderer.saves.is_empty());
    assert_eq!(renderer.shows, 0);
    assert_eq!(text.matches(NO_DATA_MESSAGE).count(), 1);
    assert!(!text.contains("Statistics:"));
}

#[test]
fn missing_log_ends_without_chart() {
    let (_root, config) = project(None);
    let mut renderer = CountingRenderer::default();
    let (out, text) = report(&config, &mut renderer);
    assert_eq!(out, Visualization::NoData);
    assert_eq!(renderer.shows, 0);
    let log_path = config.log_path.display().to_string();
    let cause = text
        .lines()
        .find(|l| l.starts_with("could not parse"))
        .unwrap_or_else(|| panic!("no parse diagnostic in\n{}", text));
    assert!(cause.contains("log file not found"), "{}", cause);
    assert!(cause.contains(&log_path), "{}", cause);
    let lines: Vec<&str> = text.lines().collect();
    let at = |needle: &str| lines.iter().position(|l| l.contains(needle)).unwrap();
    assert!(at("could not parse") < at(NO_DATA_MESSAGE));
}

#[test]
fn reports_dir_is_created_even_without_data() {
    let (root, config) = project(None);
    let mut renderer = CountingRenderer::default();
    let (out, _) = report(&config, &mut renderer);
    assert_eq!(out, Visualization::NoData);
    assert!(root.path().join("reports").is_dir());
}

#[test]
fn reports_dir_is_not_created_without_output_dir() {
    let (root, mut config) = project(Some("Timestamp,Download,Upload\n"));
    config.output_dir = None;
    let mut renderer = CountingRenderer::default();
    report(&config, &mut renderer);
    assert!(!root.path().join("reports").exists());
}

#[test]
fn malformed_log_never_yields_partial_data() {
    let (_root, config) = project(Some(
        "Timestamp,Download,Upload\n\
         2024-01-01 00:00:00,100000000,50000000\n\
         2024-01-01 01:00:00,80000000,n/a\n",
    ));
    let mut renderer = CountingRenderer::default();
    let (out, text) = report(&config, &mut renderer);
    assert_eq!(out, Visualization::NoData);
    assert!(renderer.saves.is_empty());
    assert!(text.contains("line 3: non-numeric Upload value `n/a`"), "{}", text);
}

#[test]
fn terminal_chart_precedes_statistics() {
    let (_root, mut config) = project(Some(
        "Timestamp,Download,Upload\n\
         2024-01-01 00:00:00,100000000,50000000\n\
         2024-01-01 00:30:00,80000000,40000000\n\
         2024-01-01 01:00:00,90000000,45000000\n",
    ));
    config.output_dir = None;
    let mut screen: Vec<u8> = Vec::new();
    let mut console: Vec<u8> = Vec::new();
    {
        let mut renderer = PlottersRenderer::with_screen(DEFAULT_DPI, &mut screen, 100, 30);
        run_report(&config, &mut renderer, &mut console).unwrap();
    }
    let screen = String::from_utf8(screen).unwrap();
    let console = String::from_utf8(console).unwrap();
    assert_eq!(screen.lines().count(), 30);
    assert!(screen.contains("Internet Speed Over Time"));
    assert!(!console.contains("output directory"));
    assert!(console.contains("Measurements: 3"));
}
