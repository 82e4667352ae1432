use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use related_lines::analysis::{RelationAnalyzer, build_prompt_context};
use related_lines::config::Config;
use related_lines::document::{Document, Selection, TextDocument};
use related_lines::mcp_server::RelatedLinesMcpServer;
use related_lines::paths::PlatformPaths;
use related_lines::session::SessionRegistry;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuilt:  ",
    env!("BUILD_TIMESTAMP"),
    "\ncommit: ",
    env!("GIT_COMMIT_HASH")
);

/// Heuristic code-relationship analysis
///
/// Finds the lines of a source file related to a target line: shared variables,
/// called functions, enclosing control flow, imports and class members.
#[derive(Parser, Debug)]
#[command(name = "related-lines")]
#[command(about, version, long_version = LONG_VERSION)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server over stdio
    Serve,

    /// Analyze one line (or selection) of a file
    Analyze {
        /// File to analyze
        file: PathBuf,

        /// Target line (1-based, as shown in editors)
        #[arg(short, long)]
        line: usize,

        /// Last selected line (1-based, inclusive)
        #[arg(short, long)]
        end_line: Option<usize>,

        /// Print the full analysis as JSON
        #[arg(long, conflicts_with = "prompt")]
        json: bool,

        /// Print the model prompt built from the analysis
        #[arg(long)]
        prompt: bool,
    },

    /// Read newline-delimited JSON requests on stdin, answer one JSON response per line
    Messages,

    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries MCP and NDJSON traffic
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => RelatedLinesMcpServer::serve_stdio().await?,
        Commands::Analyze {
            file,
            line,
            end_line,
            json,
            prompt,
        } => analyze(file, line, end_line, json, prompt)?,
        Commands::Messages => run_messages().await?,
        Commands::Config { init } => show_config(init)?,
    }

    Ok(())
}

fn analyze(
    file: PathBuf,
    line: usize,
    end_line: Option<usize>,
    json: bool,
    prompt: bool,
) -> Result<()> {
    if line == 0 {
        bail!("--line is 1-based");
    }
    let end_line = end_line.unwrap_or(line);
    if end_line < line {
        bail!("--end-line ({}) must not be before --line ({})", end_line, line);
    }

    let config = Config::new()?;
    let document = TextDocument::from_file(&file, config.analysis.max_file_size)?;
    if line > document.line_count() {
        bail!(
            "{} has {} lines, cannot analyze line {}",
            file.display(),
            document.line_count(),
            line
        );
    }

    let analyzer = RelationAnalyzer::with_config(config.analysis);
    let selection = Selection::new(line - 1, end_line - 1);

    if !json && !prompt {
        for related in analyzer.find_related_lines(&document, selection.start_line) {
            println!("{:>5}: {}", related + 1, document.line_at(related)?);
        }
        return Ok(());
    }

    let result = analyzer.analyze_code_selection(&document, selection)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize analysis")?
        );
    } else {
        print!("{}", build_prompt_context(&document, &result)?);
    }

    Ok(())
}

async fn run_messages() -> Result<()> {
    let config = Config::new()?;
    let mut registry = SessionRegistry::from_config(&config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = registry.handle_json(&line);
        let mut encoded = serde_json::to_string(&response).context("Failed to encode response")?;
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, {} documents still open", registry.len());
    Ok(())
}

fn show_config(init: bool) -> Result<()> {
    let path = PlatformPaths::default_config_path();
    let config = Config::new()?;

    if init {
        if path.exists() {
            println!("Config file already exists: {}", path.display());
        } else {
            Config::default().save_default()?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    println!("# {}", path.display());
    print!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to render config")?
    );
    Ok(())
}
