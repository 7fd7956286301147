//! Dodis-Harvest main entry point
//!
//! This is the command-line interface for the Dodis-Harvest archive crawler
//! and its text extraction tools.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dodis_harvest::config::{load_config_with_hash, Config};
use dodis_harvest::crawler::crawl;
use dodis_harvest::extract::{
    html_file_to_text, main_tags, text_from_file, xml_file_to_text, TokenFrequency,
};
use dodis_harvest::output::{print_summary, to_spacy};
use dodis_harvest::storage::clean_documents;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Dodis-Harvest: a polite archive harvester
///
/// Dodis-Harvest walks the dodis.ch search listing, downloads every document
/// record together with its transcription and facsimile, and turns the
/// stored transcriptions into text for language processing.
#[derive(Parser, Debug)]
#[command(name = "dodis-harvest")]
#[command(version)]
#[command(about = "A polite archive harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the archive into the documents directory
    #[command(alias = "scrap")]
    Scrape {
        /// Sitemap page to start from
        page: Option<u32>,

        /// Only fetch documents in this language (de, fr, it, ... or all)
        language: Option<String>,

        /// Directory the downloads are written to
        #[arg(long, value_name = "DIR")]
        documents_dir: Option<String>,
    },

    /// Delete every stored file of documents without a transcription
    Clean {
        /// Documents directory (defaults to the configured one)
        dir: Option<PathBuf>,
    },

    /// Print the text of a stored HTML transcription
    Html2text { file: PathBuf },

    /// Print the text body of a stored TEI transcription
    #[command(alias = "xml2Text")]
    Xml2text { file: PathBuf },

    /// Print the main tags of a stored document record
    Tags { file: PathBuf },

    /// Print the stemmed word frequencies of a text file as JSON
    #[command(alias = "tf")]
    TokenFrequency {
        /// The plain text file
        file: PathBuf,

        /// Whitespace-separated stopword list
        #[arg(long, value_name = "FILE", default_value = "stopwords.txt")]
        stopwords: PathBuf,
    },

    /// Combine a transcription and its document's tags into spaCy input
    #[command(alias = "2spacy")]
    ToSpacy {
        /// The .xml or .html transcription
        text_file: PathBuf,

        /// The document record JSON
        json_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::Scrape {
            page,
            language,
            documents_dir,
        } => handle_scrape(config, page, language, documents_dir).await,
        Command::Clean { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.output.documents_dir));
            handle_clean(&dir)
        }
        Command::Html2text { file } => {
            println!("{}", html_file_to_text(&file)?);
            Ok(())
        }
        Command::Xml2text { file } => {
            println!("{}", xml_file_to_text(&file)?);
            Ok(())
        }
        Command::Tags { file } => {
            for tag in main_tags(&file)? {
                println!("{}", tag);
            }
            Ok(())
        }
        Command::TokenFrequency { file, stopwords } => handle_token_frequency(&file, &stopwords),
        Command::ToSpacy {
            text_file,
            json_file,
        } => handle_to_spacy(&text_file, &json_file),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dodis_harvest=info,warn"),
            1 => EnvFilter::new("dodis_harvest=debug,info"),
            2 => EnvFilter::new("dodis_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles the main crawl operation
async fn handle_scrape(
    mut config: Config,
    page: Option<u32>,
    language: Option<String>,
    documents_dir: Option<String>,
) -> anyhow::Result<()> {
    if let Some(page) = page {
        config.archive.start_page = page;
    }
    if let Some(language) = language {
        config.archive.language = language;
    }
    if let Some(dir) = documents_dir {
        config.output.documents_dir = dir;
    }

    tracing::info!(
        "Scraping documents for language={} starting with sitemap page={}",
        config.archive.language,
        config.archive.start_page
    );

    let summary = crawl(config).await.context("Crawl failed")?;
    print_summary(&summary);

    Ok(())
}

/// Handles the clean command: prunes documents without a transcription
fn handle_clean(dir: &Path) -> anyhow::Result<()> {
    let report = clean_documents(dir)
        .with_context(|| format!("Failed to clean {}", dir.display()))?;

    for path in &report.removed {
        println!("Deleted {}", path.display());
    }
    println!(
        "Kept {} files of {} transcribed documents, deleted {}",
        report.kept.len(),
        report.transcribed,
        report.removed.len()
    );

    Ok(())
}

/// Handles the to-spacy command
fn handle_to_spacy(text_file: &Path, json_file: &Path) -> anyhow::Result<()> {
    let text = match text_from_file(text_file) {
        Ok(text) => text,
        Err(dodis_harvest::extract::ExtractError::UnsupportedFile(path)) => {
            bail!("Can't find the xml or html file: {}", path.display())
        }
        Err(e) => return Err(e.into()),
    };
    let tags = main_tags(json_file).context("Can't read tags")?;

    println!("{}", to_spacy(&text, &tags)?);
    Ok(())
}

/// Handles the token-frequency command
fn handle_token_frequency(file: &Path, stopwords: &Path) -> anyhow::Result<()> {
    let counter = TokenFrequency::from_stopword_file(stopwords)
        .with_context(|| format!("Can't load stopwords from {}", stopwords.display()))?;
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Can't read {}", file.display()))?;

    println!("{}", counter.to_json(&text)?);
    Ok(())
}
