use anyhow::Result;
use clap::Parser;
use echoroutes::cli::{self, OutputFormat, ScanArgs};
use echoroutes::config::Config;
use echoroutes::routes::{ParserOptions, RouteParser};
use echoroutes::scan::{self, FileRoutes, ScanOptions};
use echoroutes::{logging, report, watch};
use std::io::Write;
use std::ops::ControlFlow;

fn parser_options(opts: &ScanArgs, config: &Config) -> ParserOptions {
    let resolver = opts.resolver.unwrap_or(config.resolver);
    ParserOptions {
        strategy: opts.strategy.unwrap_or(config.strategy),
        resolve: resolver.mode(opts.passes.unwrap_or(config.passes)),
    }
}

fn print_reports(reports: &[FileRoutes], format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => report::render_text(reports),
        OutputFormat::Json => report::render_json(reports)? + "\n",
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = cli::Args::parse();
    logging::init(args.verbose);
    let config = Config::get();

    match args.command {
        cli::Command::Scan { opts } => {
            let scan_options = ScanOptions::new(opts.no_ignore, config.max_file_bytes);
            let files = scan::scan_paths(&opts.paths, scan_options)?;
            tracing::info!(files = files.len(), "scanned");
            let mut parser = RouteParser::new(parser_options(&opts, config));
            let reports = scan::collect_routes(&files, &mut parser);
            print_reports(&reports, opts.format)
        }
        cli::Command::Watch { opts, debounce_ms } => {
            let watch_config = watch::WatchConfig::new(
                debounce_ms.unwrap_or(config.watch_debounce_ms),
                ScanOptions::new(opts.no_ignore, config.max_file_bytes),
                parser_options(&opts, config),
            );
            let format = opts.format;
            watch::run(&opts.paths, watch_config, |reports| {
                match print_reports(reports, format) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(err) => {
                        // Stdout is gone (e.g. a closed pipe).
                        tracing::warn!("stopping watch: {err:#}");
                        ControlFlow::Break(())
                    }
                }
            })
        }
    }
}
