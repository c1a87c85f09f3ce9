//! This program bulk-indexes a newline-delimited JSON file into Elasticsearch.
//!
//! Each line must be a JSON object with a `_type` field naming the document type;
//! the remaining fields are indexed as the document source.

#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use anyhow::Context;
use elastic_push::{HttpBulkClient, Ingest};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "elastic-push",
    about = "Bulk-index a JSONL file into Elasticsearch"
)]
struct Args {
    #[structopt(short, long, env = "ELASTIC_URL", help = "Elasticsearch URL")]
    url: String,
    #[structopt(short, long, env = "ELASTIC_INDEX", help = "Target index")]
    index: String,
    #[structopt(short, long, help = "Path to jsonl file")]
    file: PathBuf,
    #[structopt(long, default_value = "_type", help = "Field holding the document type")]
    type_key: String,
    #[structopt(long, default_value = "500", help = "Documents per bulk request")]
    chunk_size: usize,
    #[structopt(long, help = "Progress bar width (defaults to the terminal width)")]
    width: Option<usize>,
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut client = HttpBulkClient::new(&args.url)?.with_chunk_size(args.chunk_size)?;
    let file = args.file;
    let mut ingest = Ingest::default();
    ingest
        .input_path(&file)
        .index(args.index)
        .type_key(args.type_key);
    if let Some(width) = args.width {
        ingest.width(width);
    }
    ingest
        .run(&mut client)
        .with_context(|| format!("Unable to push {}", file.display()))?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::from_args();
    if let Err(error) = run(args) {
        eprintln!("ERROR: {:#}", error);
        std::process::exit(1);
    }
}
