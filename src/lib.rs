//! Library supporting bulk-indexing newline-delimited JSON files into Elasticsearch.
//!
//! Every line of the input is a JSON object carrying its document type under a reserved key
//! (`_type` by default). The key is split off and the rest of the object becomes the document
//! source:
//!
//! ```text
//! {"_type":"a","x":1}   =>   {"index":{"_index":"idx","_type":"a"}}
//!                            {"x":1}
//! ```
//!
//! The file is streamed lazily: requests are produced one line at a time as the
//! [`BulkIndexer`] pulls them, while a [`ProgressTracker`] draws the fraction of bytes read.

#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::default_trait_access,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

mod error;
pub use error::{IngestError, TransformError};

mod record;
pub use record::{IndexRequest, OpType, RecordTransformer, DEFAULT_TYPE_KEY};

mod progress;
pub use progress::{ProgressBuilder, ProgressTracker, DEFAULT_WIDTH};

mod bulk;
pub use bulk::{encode_request, BulkIndexer, BulkStats, HttpBulkClient, DEFAULT_CHUNK_SIZE};

mod ingest;
pub use ingest::{Ingest, ACTIVITY};
