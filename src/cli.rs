use super::chart::DEFAULT_DPI;
use super::{ReportConfig, VERSION};
use clap::{App, Arg, ArgMatches};
use std::path::PathBuf;

/// What the command line asks for, paths already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: ReportConfig,
    pub display: bool,
    pub dpi: u32,
    pub verbose: bool,
}

fn app() -> App<'static, 'static> {
    let arg_root = Arg::with_name("root")
        .help("project root holding the log file and the reports directory")
        .short("r")
        .long("root")
        .takes_value(true)
        .default_value(".");
    let arg_logfile = Arg::with_name("logfile")
        .help("speed test log, defaults to <root>/internet_speed.log")
        .short("f")
        .long("logfile")
        .takes_value(true);
    let arg_outdir = Arg::with_name("outdir")
        .help("directory for the chart image, defaults to <root>/reports")
        .short("o")
        .long("outdir")
        .takes_value(true);
    let arg_no_save = Arg::with_name("no_save")
        .help("do not save the chart image")
        .long("no-save")
        .conflicts_with("outdir");
    let arg_no_display = Arg::with_name("no_display")
        .help("do not show the chart in the terminal")
        .long("no-display");
    let arg_dpi = Arg::with_name("dpi")
        .help("resolution of the saved chart, on a 12x6 inch canvas")
        .long("dpi")
        .takes_value(true)
        .default_value("300")
        .validator(|v| match v.parse::<u32>() {
            Ok(d) if d > 0 && d <= 1200 => Ok(()),
            _ => Err(String::from("dpi must be an integer between 1 and 1200")),
        });
    let arg_verbose = Arg::with_name("verbose")
        .help("print debug information")
        .short("v")
        .long("verbose")
        .takes_value(false);
    App::new("speedtest_visualize")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to plot and summarize the internet speed log")
        .arg(arg_root)
        .arg(arg_logfile)
        .arg(arg_outdir)
        .arg(arg_no_save)
        .arg(arg_no_display)
        .arg(arg_dpi)
        .arg(arg_verbose)
}

fn options_from(cli_args: &ArgMatches) -> CliOptions {
    let root = PathBuf::from(cli_args.value_of("root").unwrap_or_default());
    let mut config = ReportConfig::from_root(root);
    if let Some(p) = cli_args.value_of("logfile") {
        config.log_path = PathBuf::from(p);
    }
    if let Some(p) = cli_args.value_of("outdir") {
        config.output_dir = Some(PathBuf::from(p));
    }
    if cli_args.is_present("no_save") {
        config.output_dir = None;
    }
    let dpi = cli_args
        .value_of("dpi")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_DPI);
    CliOptions {
        config,
        display: !cli_args.is_present("no_display"),
        dpi,
        verbose: cli_args.is_present("verbose"),
    }
}

/// Takes the CLI arguments that control the report; none of them is required.
pub fn parse_cli() -> CliOptions {
    options_from(&app().get_matches())
}
