use clap::{Parser, Subcommand, ValueEnum};
use deckweave::compose::{AssemblyOutput, extract, load_structure};
use deckweave::config::Config;
use deckweave::oracle::{KeywordOracle, SelectionOracle};
use deckweave::{Document, assemble};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OracleKind {
    /// Score slides by keyword occurrences, offline
    Keyword,
    /// Ask the configured chat-completions endpoint
    #[cfg(feature = "http_oracle")]
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "deckweave", version, about = "Assemble PowerPoint decks from a template and a source deck", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a deck from a template, a source deck and a structure file
    Assemble {
        /// Template deck whose slides are filled
        #[arg(long)]
        template: PathBuf,
        /// Deck the content is taken from
        #[arg(long)]
        source: PathBuf,
        /// YAML list of `{ keyword, action }` steps
        #[arg(long)]
        structure: PathBuf,
        /// Where to write the assembled deck
        #[arg(long, short)]
        output: PathBuf,
        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OracleKind::Keyword)]
        oracle: OracleKind,
        /// Write the audit log here as YAML instead of to stdout
        #[arg(long)]
        audit_log: Option<PathBuf>,
    },
    /// Print slide titles and theme of a deck
    Inspect {
        file: PathBuf,
    },
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deckweave=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deckweave=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn read(path: &Path) -> CliResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| format!("failed to read {}: {}", path.display(), e).into())
}

async fn run_with<O: SelectionOracle + 'static>(
    template: &Path,
    source: &Path,
    structure: &Path,
    config: Config,
    oracle: O,
) -> CliResult<AssemblyOutput> {
    let steps = load_structure(structure)?;
    let output = assemble(&read(template)?, &read(source)?, steps, Arc::new(oracle), config).await?;
    Ok(output)
}

fn inspect(path: &Path) -> CliResult<()> {
    let deck = Document::load(&read(path)?)?;
    println!("{}: {} slides", path.display(), deck.slide_count());
    if let Some((width, height)) = deck.slide_size() {
        println!("slide size: {} x {} EMU", width, height);
    }
    for (index, slide) in deck.slides().iter().enumerate() {
        let title = extract(slide).title;
        if title.is_empty() {
            println!("  {:>3}  (untitled)", index);
        } else {
            println!("  {:>3}  {}", index, title.replace('\n', " / "));
        }
    }

    match deck.theme()? {
        Some(theme) => {
            println!("theme: {} (colors: {})", theme.name, theme.color_scheme);
            for color in &theme.colors {
                let value = match (&color.rgb, &color.system_color) {
                    (Some(rgb), _) => format!("#{}", rgb.to_hex()),
                    (None, Some(system)) => system.clone(),
                    (None, None) => "-".to_string(),
                };
                println!("  {:<10} {}", color.name, value);
            }
            if let Some(ref font) = theme.major_font {
                println!("  major font: {}", font);
            }
            if let Some(ref font) = theme.minor_font {
                println!("  minor font: {}", font);
            }
        },
        None => println!("theme: none"),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Assemble {
            template,
            source,
            structure,
            output,
            config,
            oracle,
            audit_log,
        } => assemble_command(template, source, structure, output, config, oracle, audit_log).await,
        Commands::Inspect { file } => inspect(&file),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn assemble_command(
    template: PathBuf,
    source: PathBuf,
    structure: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    oracle: OracleKind,
    audit_log: Option<PathBuf>,
) -> CliResult<()> {
    let config = match config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let assembled = match oracle {
        OracleKind::Keyword => run_with(&template, &source, &structure, config, KeywordOracle::new()).await?,
        #[cfg(feature = "http_oracle")]
        OracleKind::Http => {
            let http = deckweave::oracle::HttpOracle::from_config(&config.oracle)?;
            run_with(&template, &source, &structure, config, http).await?
        },
    };

    std::fs::write(&output, &assembled.bytes)
        .map_err(|e| format!("failed to write {}: {}", output.display(), e))?;
    tracing::info!("Wrote {} ({} bytes)", output.display(), assembled.bytes.len());

    let yaml = assembled.audit.to_yaml()?;
    match audit_log {
        Some(path) => std::fs::write(&path, yaml).map_err(|e| format!("failed to write {}: {}", path.display(), e))?,
        None => print!("{}", yaml),
    }
    Ok(())
}
