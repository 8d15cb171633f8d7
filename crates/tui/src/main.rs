mod renderer;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;
use trail_chart_core::{ChartConfig, ChartController, JsonLinesFeed};

const USAGE: &str = "Usage: trail-chart <feed.jsonl> [--activity <name>] [--config <chart.json>] [--svg <out.svg>] [--log <file>]";

#[derive(Debug, Default)]
struct Args {
    feed: PathBuf,
    activity: Option<String>,
    config: Option<PathBuf>,
    svg: Option<PathBuf>,
    log: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut feed = None;
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--activity" => parsed.activity = Some(value("--activity")?),
            "--config" => parsed.config = Some(value("--config")?.into()),
            "--svg" => parsed.svg = Some(value("--svg")?.into()),
            "--log" => parsed.log = Some(value("--log")?.into()),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            path if feed.is_none() => feed = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument {extra}"),
        }
    }
    parsed.feed = feed.context("missing change feed path")?;
    Ok(parsed)
}

/// Logs go to `--log` when given. Otherwise only the SVG export logs, to
/// stderr, since the live view owns the terminal.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Some(path) = &args.log {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if args.svg.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(1);
        }
    };
    init_logging(&args)?;

    let mut config = match &args.config {
        Some(path) => ChartConfig::load(path)?,
        None => ChartConfig::default(),
    };
    if let Some(activity) = &args.activity {
        config.activity.clone_from(activity);
    }

    let file = File::open(&args.feed)
        .with_context(|| format!("opening change feed {}", args.feed.display()))?;
    let mut feed = JsonLinesFeed::new(BufReader::new(file));
    let mut controller = ChartController::new(config);

    if let Some(out) = &args.svg {
        controller.run(&mut feed, |_, _| {})?;
        std::fs::write(out, controller.to_svg(0.0))
            .with_context(|| format!("writing {}", out.display()))?;
        tracing::info!(path = %out.display(), "wrote chart");
        return Ok(());
    }

    renderer::render_live(&mut controller, &mut feed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_feed_and_flags() {
        let parsed = args(&["feed.jsonl", "--activity", "running", "--svg", "out.svg"]).unwrap();
        assert_eq!(parsed.feed, PathBuf::from("feed.jsonl"));
        assert_eq!(parsed.activity.as_deref(), Some("running"));
        assert_eq!(parsed.svg, Some(PathBuf::from("out.svg")));
        assert!(parsed.config.is_none());
    }

    #[test]
    fn rejects_missing_feed_and_unknown_flags() {
        assert!(args(&[]).is_err());
        assert!(args(&["feed.jsonl", "--colour", "red"]).is_err());
        assert!(args(&["feed.jsonl", "--activity"]).is_err());
    }
}
