use env_logger::Env;
use speedtest_analyzer::chart::PlottersRenderer;
use speedtest_analyzer::cli::parse_cli;
use speedtest_analyzer::run_report;
use std::io;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = parse_cli();
    let level = if opts.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let mut renderer = PlottersRenderer::new(opts.dpi);
    if !opts.display {
        renderer = renderer.without_screen();
    }
    run_report(&opts.config, &mut renderer, &mut io::stdout())?;
    Ok(())
}
