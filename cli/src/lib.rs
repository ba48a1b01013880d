use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use search_core::{
    paginate, process_queries, remove_duplicates, DocId, Document, DocumentFilter, DocumentStatus,
    ExecutionMode, Rating, SearchIndex,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

#[derive(Debug, Serialize)]
pub struct QueryReport<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    pub results: &'a [Document],
}

/// `.json` and `.jsonl` files under `input`, or `input` itself when it is a file.
pub fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

pub fn read_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let mut docs = Vec::new();
    for file in collect_files(input) {
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    for (line_no, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), line_no + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "skipping file without documents"),
    }
    Ok(())
}

/// Load every document under `input` into a fresh index.
pub fn build_index(input: &Path, stop_words: &str) -> Result<SearchIndex> {
    let mut index = SearchIndex::from_stop_words_text(stop_words).context("invalid stop words")?;
    for doc in read_documents(input)? {
        index
            .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
            .with_context(|| format!("adding document {}", doc.id))?;
    }
    tracing::info!(
        documents = index.document_count(),
        terms = index.term_count(),
        "index built"
    );
    Ok(index)
}

#[derive(Debug, Parser)]
#[command(name = "search")]
#[command(about = "Query an in-memory TF-IDF index built from JSON documents", long_about = None)]
pub struct Cli {
    /// Input path (file or directory of .json/.jsonl documents)
    #[arg(long, global = true, default_value = "./docs")]
    pub input: PathBuf,
    /// Space-separated stop words
    #[arg(long, global = true, default_value = "")]
    pub stop_words: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank documents for each query
    Search {
        /// How queries are executed
        #[arg(long, value_enum, default_value_t = Mode::Batch)]
        mode: Mode,
        /// Only return documents with this status (not available in batch mode)
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Split each result list into pages of this size
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// List the query terms found in one document
    Match {
        #[arg(long)]
        id: DocId,
        query: String,
    },
    /// Remove documents whose term sets repeat an earlier document's
    Dedup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// All queries concurrently, each scored on one thread
    Batch,
    /// One query at a time, sequential scoring
    Seq,
    /// One query at a time, parallel scoring
    Par,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Active,
    Irrelevant,
    Banned,
    Removed,
}

impl From<StatusArg> for DocumentStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => DocumentStatus::Active,
            StatusArg::Irrelevant => DocumentStatus::Irrelevant,
            StatusArg::Banned => DocumentStatus::Banned,
            StatusArg::Removed => DocumentStatus::Removed,
        }
    }
}

/// Build the index named by `cli` and execute its command. Returns the JSON
/// lines to print, in output order.
pub fn run(cli: Cli) -> Result<Vec<String>> {
    let mut index = build_index(&cli.input, &cli.stop_words)?;
    let mut lines = Vec::new();

    match cli.command {
        Commands::Search { mode, status, page_size, queries } => {
            let groups = match mode {
                Mode::Batch => {
                    if status.is_some() {
                        bail!("--status requires --mode seq or --mode par");
                    }
                    process_queries(&index, &queries)?
                }
                Mode::Seq | Mode::Par => {
                    let execution = if mode == Mode::Par {
                        ExecutionMode::Parallel
                    } else {
                        ExecutionMode::Sequential
                    };
                    let filter = status
                        .map_or(DocumentFilter::Default, |s| DocumentFilter::Status(s.into()));
                    queries
                        .iter()
                        .map(|q| index.find_top_documents_with(execution, q, filter))
                        .collect::<Result<Vec<_>, _>>()?
                }
            };
            for (query, results) in queries.iter().zip(&groups) {
                match page_size {
                    Some(size) => {
                        for (page, window) in paginate(results, size)?.into_iter().enumerate() {
                            let report = QueryReport { query, page: Some(page), results: window };
                            lines.push(serde_json::to_string(&report)?);
                        }
                    }
                    None => {
                        let report = QueryReport { query, page: None, results };
                        lines.push(serde_json::to_string(&report)?);
                    }
                }
            }
        }
        Commands::Match { id, query } => {
            let (words, status) = index.match_document(&query, id)?;
            let json = serde_json::json!({ "id": id, "status": status, "words": words });
            lines.push(json.to_string());
        }
        Commands::Dedup => {
            let removed = remove_duplicates(&mut index);
            let json = serde_json::json!({ "removed": removed, "remaining": index.document_count() });
            lines.push(json.to_string());
        }
    }
    Ok(lines)
}
