//! Loader for aspect-judged evaluation datasets.
//!
//! # Data Format
//!
//! ```text
//! data/
//! ├── corpus.jsonl     # {"doc_id": "...", "text": "..."}
//! ├── queries.jsonl    # {"query_id": "...", "text": "..."}
//! └── aspects.tsv      # query_id \t aspect_id \t doc_id [\t grade]
//! ```
//!
//! Queries are evaluated in the order they appear in `queries.jsonl`. In
//! `aspects.tsv`, blank lines and lines starting with `#` are skipped and a
//! missing grade means 1.

use crate::evaluation::EvalInputs;
use crate::types::{DocId, Document, Query, QueryAspects, QueryId};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub const CORPUS_FILE: &str = "corpus.jsonl";
pub const QUERIES_FILE: &str = "queries.jsonl";
pub const ASPECTS_FILE: &str = "aspects.tsv";

/// Error type for dataset loading.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// IO error reading files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Missing required file
    #[error("Missing file: {0}")]
    MissingFile(String),
    /// Malformed line
    #[error("{file} line {line}: {message}")]
    InvalidFormat {
        file: &'static str,
        line: usize,
        message: String,
    },
    /// The same query ID appears twice in the query file
    #[error("Duplicate query id '{0}'")]
    DuplicateQuery(QueryId),
}

/// A fully loaded dataset.
#[derive(Debug, Clone, Default)]
pub struct AspectDataset {
    /// Query IDs in file order
    pub query_ids: Vec<QueryId>,
    pub documents: BTreeMap<DocId, Document>,
    pub queries: HashMap<QueryId, Query>,
    pub aspects: HashMap<QueryId, QueryAspects>,
}

impl AspectDataset {
    /// Borrowed view for the evaluation driver.
    pub fn inputs(&self) -> EvalInputs<'_> {
        EvalInputs {
            query_ids: &self.query_ids,
            documents: &self.documents,
            query_content: &self.queries,
            query_aspects: &self.aspects,
        }
    }

    pub fn num_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn num_queries(&self) -> usize {
        self.query_ids.len()
    }

    /// Total number of (aspect, document) judgments with a positive grade.
    pub fn num_judgments(&self) -> usize {
        self.aspects
            .values()
            .map(|a| a.aspect_ids().map(|id| a.aspect_weight(id) as usize).sum::<usize>())
            .sum()
    }
}

/// Loads a dataset from `data_dir`.
///
/// Only queries with at least one row in `aspects.tsv` get a
/// [`QueryAspects`] entry, so an unjudged query fails evaluation instead of
/// scoring as fully covered. Judgments for unknown queries are ignored with
/// a warning.
pub fn load_dataset(data_dir: &Path) -> Result<AspectDataset, DatasetError> {
    let corpus_path = data_dir.join(CORPUS_FILE);
    let queries_path = data_dir.join(QUERIES_FILE);
    let aspects_path = data_dir.join(ASPECTS_FILE);

    for path in [&corpus_path, &queries_path, &aspects_path] {
        if !path.exists() {
            return Err(DatasetError::MissingFile(path.display().to_string()));
        }
    }

    let documents: BTreeMap<DocId, Document> = load_jsonl::<Document>(&corpus_path, CORPUS_FILE)?
        .into_iter()
        .map(|doc| (doc.doc_id.clone(), doc))
        .collect();

    let mut query_ids = Vec::new();
    let mut queries = HashMap::new();
    for query in load_jsonl::<Query>(&queries_path, QUERIES_FILE)? {
        let id = query.query_id.clone();
        if queries.insert(id.clone(), query).is_some() {
            return Err(DatasetError::DuplicateQuery(id));
        }
        query_ids.push(id);
    }

    let mut aspects: HashMap<QueryId, QueryAspects> = HashMap::new();
    let mut ignored = 0usize;
    for (query_id, aspect, doc_id, grade) in load_aspects(&aspects_path)? {
        if !queries.contains_key(&query_id) {
            ignored += 1;
            continue;
        }
        aspects
            .entry(query_id.clone())
            .or_insert_with(|| QueryAspects::new(query_id))
            .add_judgment(&aspect, doc_id, grade);
    }
    if ignored > 0 {
        warn!("Ignored {} judgments for unknown queries", ignored);
    }
    let unjudged = query_ids.iter().filter(|id| !aspects.contains_key(*id)).count();
    if unjudged > 0 {
        warn!("{} queries have no judgments", unjudged);
    }

    info!(
        "Loaded {} documents, {} queries from {}",
        documents.len(),
        query_ids.len(),
        data_dir.display()
    );

    Ok(AspectDataset {
        query_ids,
        documents,
        queries,
        aspects,
    })
}

/// Loads a JSONL file into a vector of deserialized items.
fn load_jsonl<T: DeserializeOwned>(path: &Path, file: &'static str) -> Result<Vec<T>, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    let mut items = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).map_err(|e| DatasetError::InvalidFormat {
            file,
            line: line_num + 1,
            message: e.to_string(),
        })?;
        items.push(item);
    }

    Ok(items)
}

/// Loads `(query_id, aspect_id, doc_id, grade)` rows from a TSV file.
fn load_aspects(path: &Path) -> Result<Vec<(QueryId, String, DocId, u8)>, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let invalid = |message: String| DatasetError::InvalidFormat {
            file: ASPECTS_FILE,
            line: line_num + 1,
            message,
        };

        let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(invalid(format!(
                "expected 3 or 4 tab-separated fields, got {}",
                parts.len()
            )));
        }

        let grade = match parts.get(3) {
            Some(raw) => raw
                .parse::<u8>()
                .map_err(|_| invalid(format!("invalid grade '{}'", raw)))?,
            None => 1,
        };

        rows.push((
            QueryId::from(parts[0]),
            parts[1].to_string(),
            DocId::from(parts[2]),
            grade,
        ));
    }

    Ok(rows)
}
