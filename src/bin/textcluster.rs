use clap::Parser;
use std::path::PathBuf;
use textcluster::config::{ClusterConfig, Lang, NameLen};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "textcluster", version, about = "Streaming near-duplicate clustering of text lines")]
struct Cli {
    /// Input file, one record per line
    #[arg(long = "infile", default_value = "./data/infile")]
    infile: PathBuf,

    /// Directory receiving one file per cluster plus index.json
    #[arg(long = "output", default_value = "./data/output")]
    output: PathBuf,

    /// Segmentation dictionary (cn mode)
    #[arg(long = "dict", default_value = "./data/seg_dict")]
    dict: PathBuf,

    /// Stop-word list, one per line; ignored if absent
    #[arg(long = "stop-words", default_value = "./data/stop_words")]
    stop_words: PathBuf,

    /// Lines sampled from a candidate cluster
    #[arg(long = "sample-number", default_value_t = 5)]
    sample_number: usize,

    /// Jaccard similarity a line must exceed against every sampled line
    #[arg(long = "threshold", default_value_t = 0.3)]
    threshold: f64,

    /// Width of zero-padded cluster file names
    #[arg(long = "name-len", default_value_t = 9)]
    name_len: usize,

    /// Derive the name width from the input line count instead of --name-len
    #[arg(long = "name-len-update", default_value_t = false)]
    name_len_update: bool,

    #[arg(long = "lang", value_enum, default_value = "cn")]
    lang: Lang,

    /// Text after this delimiter is stored but not clustered on
    #[arg(long = "payload-delimiter")]
    payload_delimiter: Option<String>,

    /// Seed for cluster sampling (reproducible runs)
    #[arg(long = "seed")]
    seed: Option<u64>,
}

impl From<Cli> for ClusterConfig {
    fn from(cli: Cli) -> Self {
        ClusterConfig {
            input: cli.infile,
            output: cli.output,
            dict: cli.dict,
            stop_words: cli.stop_words,
            sample_number: cli.sample_number,
            threshold: cli.threshold,
            name_len: if cli.name_len_update { NameLen::Auto } else { NameLen::Fixed(cli.name_len) },
            lang: cli.lang,
            payload_delimiter: cli.payload_delimiter,
            seed: cli.seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config: ClusterConfig = Cli::parse().into();
    let report = textcluster::run(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
