use crate::routes::extract::Strategy;
use crate::routes::resolve::ResolverKind;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "echoroutes",
    version,
    about = "Recover router-group route tables from Go sources",
    after_help = r#"Examples:
  echoroutes scan .
  echoroutes scan cmd/server/main.go --format json
  echoroutes scan . --strategy lexical --resolver topological
  echoroutes watch internal/ --debounce-ms 300
"#
)]
pub struct Args {
    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse Go files once and print their routes.
    Scan {
        #[command(flatten)]
        opts: ScanArgs,
    },
    /// Print routes, then re-print whenever they change.
    Watch {
        #[command(flatten)]
        opts: ScanArgs,
        /// Quiet period before re-parsing changed files, in milliseconds.
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ScanArgs {
    /// Files or directories to scan.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
    /// Declaration extraction strategy.
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,
    /// How group prefixes are resolved.
    #[arg(long, value_enum)]
    pub resolver: Option<ResolverKind>,
    /// Sweeps made by the fixed-point resolver.
    #[arg(long)]
    pub passes: Option<usize>,
    /// Include files ignored by .gitignore.
    #[arg(long)]
    pub no_ignore: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scan_flags() {
        let args = Args::try_parse_from([
            "echoroutes",
            "-vv",
            "scan",
            "a.go",
            "pkg",
            "--format",
            "json",
            "--strategy",
            "lexical",
            "--resolver",
            "topological",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        let Command::Scan { opts } = args.command else {
            panic!("expected scan");
        };
        assert_eq!(opts.paths, vec![PathBuf::from("a.go"), PathBuf::from("pkg")]);
        assert_eq!(opts.format, OutputFormat::Json);
        assert_eq!(opts.strategy, Some(Strategy::Lexical));
        assert_eq!(opts.resolver, Some(ResolverKind::Topological));
        assert_eq!(opts.passes, None);
    }

    #[test]
    fn watch_defaults_to_current_dir() {
        let args = Args::try_parse_from(["echoroutes", "watch", "--debounce-ms", "10"]).unwrap();
        let Command::Watch { opts, debounce_ms } = args.command else {
            panic!("expected watch");
        };
        assert_eq!(opts.paths, vec![PathBuf::from(".")]);
        assert_eq!(opts.format, OutputFormat::Text);
        assert_eq!(debounce_ms, Some(10));
    }
}
