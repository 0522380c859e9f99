//! Parse a Trellis markup file and print the element tree.
//!
//! ```text
//! trellis-inspect page.tml -d window -d button -p widgets.tml -s theme.tss
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as _;
use trellis::{Parser, ParserConfig, Styles};

mod render;

#[derive(Debug, clap::Parser)]
#[command(name = "trellis-inspect", version, about = "Parse Trellis markup and print the element tree")]
struct Args {
    /// Markup document (.tml) to parse.
    file: Option<PathBuf>,

    /// Element name accepted by the parser. Repeatable.
    #[arg(short, long = "define", value_name = "NAME")]
    define: Vec<String>,

    /// File whose prefab definitions are loaded before the document. Repeatable.
    #[arg(short, long = "prefabs", value_name = "FILE")]
    prefabs: Vec<PathBuf>,

    /// Style sheet (.tss) to parse and print. Repeatable; later sheets win.
    #[arg(short, long = "styles", value_name = "FILE")]
    styles: Vec<PathBuf>,

    /// Keep the style attribute as plain text.
    #[arg(long)]
    no_styles: bool,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref());
    run(&args)
}

/// Logs go to stderr so printed trees stay clean on stdout.
fn init_logging(flag: Option<&str>) {
    let filter = log_filter(flag, std::env::var("RUST_LOG").ok());
    env_logger::Builder::new()
        .parse_filters(&filter)
        .target(env_logger::Target::Stderr)
        .init();
}

/// `--log` wins over `RUST_LOG`; with neither only warnings and errors show.
fn log_filter(flag: Option<&str>, env: Option<String>) -> String {
    flag.map(str::to_string).or(env).unwrap_or_else(|| "warn".to_string())
}

fn run(args: &Args) -> Result<()> {
    let mut parser = Parser::with_config(ParserConfig {
        parse_styles: !args.no_styles,
        ..ParserConfig::default()
    });
    parser.add_definitions(args.define.iter().cloned());

    for path in &args.prefabs {
        let src = read(path)?;
        parser
            .add_prefabs(&src)
            .with_context(|| format!("loading prefabs from {}", path.display()))?;
    }
    if !args.prefabs.is_empty() {
        log::info!("{} prefabs loaded", parser.prefabs().len());
    }

    if let Some(path) = &args.file {
        let src = read(path)?;
        let root = parser
            .parse(&src)
            .with_context(|| format!("parsing {}", path.display()))?;
        print!("{}", render::tree(&root)?);
    }

    if !args.styles.is_empty() {
        let mut styles = Styles::new();
        for path in &args.styles {
            let src = read(path)?;
            let sheet = trellis::parse_styles(&src)
                .with_context(|| format!("parsing style sheet {}", path.display()))?;
            styles.add(sheet);
        }
        print!("{}", render::sheet(&styles)?);
    }

    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    log::debug!("reading {}", path.display());
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}
