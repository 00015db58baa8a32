use crate::assigner::{AssignOpts, ClusterAssigner};
use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::finalize::{ClusterSummary, Finalizer};
use crate::stopwords::StopWords;
use crate::store::DirStore;
use crate::tokenizer::Segmenter;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, info_span};

const PROGRESS_EVERY: usize = 10_000;
const REPORT_TOP: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub index_path: PathBuf,
    pub total_lines: usize,
    pub cluster_count: usize,
    pub name_len: usize,
    pub matched: usize,
    pub candidates_tried: usize,
    pub top_clusters: Vec<ClusterSummary>,
    pub started_at: String,
    pub finished_at: String,
    pub elapsed_ms: u128,
}

/// Clusters every line of `config.input` into `config.output`.
pub fn run(config: &ClusterConfig) -> Result<RunReport> {
    let started_at = Utc::now();
    let clock = Instant::now();

    config.validate()?;
    let name_len = config.resolve_name_len()?;
    let stop_words = StopWords::load(&config.stop_words)?;
    let segmenter = Segmenter::load(config.lang, &config.dict)?;
    let store = DirStore::open(&config.output, name_len)?;
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        name_len,
        sample_number = config.sample_number,
        threshold = config.threshold,
        "clustering started"
    );

    let opts = AssignOpts {
        sample_number: config.sample_number,
        threshold: config.threshold,
        payload_delimiter: config.payload_delimiter.as_deref(),
    };
    let mut assigner = ClusterAssigner::new(store, Box::new(segmenter), stop_words, opts, config.seed);

    {
        let _span = info_span!("ingest").entered();
        let f = File::open(&config.input)
            .map_err(|e| ClusterError::configuration(&config.input, e.to_string()))?;
        for (n, line) in BufReader::new(f).lines().enumerate() {
            let line = line.map_err(|e| ClusterError::configuration(&config.input, e.to_string()))?;
            assigner.assign(&line)?;
            if (n + 1) % PROGRESS_EVERY == 0 {
                let stats = assigner.stats();
                info!(lines = n + 1, clusters = stats.created, "progress");
            }
        }
    }

    let stats = assigner.stats();
    debug!(?stats, "ingestion finished");
    let (mut store, index) = assigner.into_parts();
    let (done, index_path) = Finalizer::new(name_len).finalize(&mut store, index, &config.output)?;

    let finished_at = Utc::now();
    info!(lines = stats.lines, clusters = done.clusters.len(), "all is well");
    Ok(RunReport {
        input: config.input.clone(),
        output: config.output.clone(),
        index_path,
        total_lines: stats.lines,
        cluster_count: done.clusters.len(),
        name_len,
        matched: stats.matched,
        candidates_tried: stats.candidates_tried,
        top_clusters: done.clusters.into_iter().take(REPORT_TOP).collect(),
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        finished_at: finished_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        elapsed_ms: clock.elapsed().as_millis(),
    })
}
