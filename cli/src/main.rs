use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docchat_core::normalize::collapse_whitespace;
use docchat_core::{answer, build_index, Index, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K};
use std::fs;
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Ask questions against a single extracted document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question and exit
    Ask {
        /// Path to the extracted document text
        #[arg(long)]
        document: String,
        /// The question to answer
        #[arg(long)]
        query: String,
        /// Number of passages to answer from
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        /// Passage size budget in characters
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Interactive question loop over one document
    Chat {
        /// Path to the extracted document text
        #[arg(long)]
        document: String,
        /// Number of passages to answer from
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        /// Passage size budget in characters
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask { document, query, top_k, chunk_size } => {
            let index = load_index(&document, chunk_size)?;
            println!("{}", answer(&query, &index, top_k));
            Ok(())
        }
        Commands::Chat { document, top_k, chunk_size } => {
            let index = load_index(&document, chunk_size)?;
            chat_loop(&index, top_k)
        }
    }
}

fn load_index(document: &str, chunk_size: usize) -> Result<Index> {
    let raw = fs::read_to_string(document)
        .with_context(|| format!("reading document {document}"))?;
    let text = collapse_whitespace(&raw);
    let index = build_index(&text, chunk_size.max(1));
    tracing::info!(passages = index.passages().len(), "document indexed");
    Ok(index)
}

fn chat_loop(index: &Index, top_k: usize) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query == "exit" {
            break;
        }
        if query.is_empty() {
            continue;
        }
        println!("{}", answer(query, index, top_k));
    }
    Ok(())
}
