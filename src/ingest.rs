use crate::{
    BulkIndexer, BulkStats, IndexRequest, IngestError, ProgressBuilder, ProgressTracker,
    RecordTransformer,
};
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

/// Label printed in front of the progress bar.
pub const ACTIVITY: &str = "Indexing ";

/// Lines of a reader together with the number of bytes each consumed, terminator included.
struct RawLines<R> {
    reader: R,
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = io::Result<(Vec<u8>, u64)>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(bytes) => {
                if line.ends_with(b"\n") {
                    line.pop();
                    if line.ends_with(b"\r") {
                        line.pop();
                    }
                }
                Some(Ok((line, bytes as u64)))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Pushes a JSONL file into a bulk indexer while drawing a progress bar over the bytes read.
///
/// # Examples
///
/// ```no_run
/// # use elastic_push::{HttpBulkClient, Ingest};
/// # fn main() -> Result<(), elastic_push::IngestError> {
/// let mut client = HttpBulkClient::new("http://localhost:9200")?;
/// let stats = Ingest::default()
///     .input_path("records.jsonl")
///     .index("records")
///     .run(&mut client)?;
/// assert_eq!(stats.errors, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct Ingest {
    input_path: Option<PathBuf>,
    index: Option<String>,
    type_key: Option<String>,
    width: Option<usize>,
}

impl Ingest {
    /// Sets the JSONL file to read.
    pub fn input_path<P: Into<PathBuf>>(&mut self, path: P) -> &mut Self {
        self.input_path = Some(path.into());
        self
    }

    /// Sets the target index.
    pub fn index<S: Into<String>>(&mut self, index: S) -> &mut Self {
        self.index = Some(index.into());
        self
    }

    /// Overrides the key holding the document type, `_type` by default.
    pub fn type_key<S: Into<String>>(&mut self, type_key: S) -> &mut Self {
        self.type_key = Some(type_key.into());
        self
    }

    /// Forces the width of the progress bar.
    pub fn width(&mut self, width: usize) -> &mut Self {
        self.width = Some(width);
        self
    }

    /// Runs the ingestion, drawing progress and the final summary to standard output.
    ///
    /// # Errors
    ///
    /// Returns an error when:
    /// - the input path or index is not set, or the input file is empty,
    /// - the input cannot be read or a line cannot be transformed,
    /// - the indexer fails.
    pub fn run<B: BulkIndexer>(&self, indexer: &mut B) -> Result<BulkStats, IngestError> {
        let (file, total, transformer) = self.open()?;
        let progress = self.progress_builder(total).build()?;
        let stats = push(indexer, file, &transformer, progress)?;
        writeln!(io::stdout(), "{}", stats)?;
        Ok(stats)
    }

    /// Same as [`Ingest::run`] but writes progress and the summary to `output`.
    ///
    /// # Errors
    ///
    /// See [`Ingest::run`].
    pub fn run_with_output<B, W>(&self, indexer: &mut B, mut output: W) -> Result<BulkStats, IngestError>
    where
        B: BulkIndexer,
        W: Write,
    {
        let (file, total, transformer) = self.open()?;
        let progress = self
            .progress_builder(total)
            .build_with_output(&mut output)?;
        let stats = push(indexer, file, &transformer, progress)?;
        writeln!(output, "{}", stats)?;
        Ok(stats)
    }

    fn progress_builder(&self, total: u64) -> ProgressBuilder {
        let builder = ProgressBuilder::new(total).activity(ACTIVITY);
        match self.width {
            Some(width) => builder.width(width),
            None => builder,
        }
    }

    fn open(&self) -> Result<(File, u64, RecordTransformer), IngestError> {
        let path = self
            .input_path
            .as_ref()
            .ok_or_else(|| IngestError::configuration("input path not set"))?;
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| IngestError::configuration("index not set"))?;
        let mut transformer = RecordTransformer::new(index.as_str());
        if let Some(type_key) = &self.type_key {
            transformer = transformer.type_key(type_key.as_str());
        }
        let total = std::fs::metadata(path)?.len();
        if total == 0 {
            return Err(IngestError::configuration(format!(
                "{} is empty",
                path.display()
            )));
        }
        let file = File::open(path)?;
        info!(
            "Indexing {} ({} bytes) into `{}`",
            path.display(),
            total,
            index
        );
        Ok((file, total, transformer))
    }
}

/// Streams `file` through `transformer` into `indexer`, ticking `progress` once per line.
///
/// The progress bar is cancelled if the run fails.
fn push<B, W>(
    indexer: &mut B,
    file: File,
    transformer: &RecordTransformer,
    mut progress: ProgressTracker<W>,
) -> Result<BulkStats, IngestError>
where
    B: BulkIndexer,
    W: Write,
{
    progress.draw()?;
    let lines = RawLines {
        reader: BufReader::new(file),
    };
    let requests = lines.enumerate().map(
        |(index, line)| -> Result<IndexRequest, IngestError> {
            let (line, bytes) = line?;
            let request = transformer
                .transform_bytes(&line)
                .map_err(|source| IngestError::Transform {
                    line: index + 1,
                    source,
                })?;
            progress.tick(bytes)?;
            Ok(request)
        },
    );
    match indexer.bulk(requests) {
        Ok(stats) => {
            progress.done()?;
            Ok(stats)
        }
        Err(err) => {
            if let Err(cancel_err) = progress.cancel() {
                warn!("Unable to finish the progress bar: {}", cancel_err);
            }
            Err(err)
        }
    }
}
