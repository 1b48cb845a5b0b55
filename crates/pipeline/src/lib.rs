//! Document processing pipeline: parse-event extraction, segmentation,
//! orchestration, and background dispatch.
//!
//! Flow: the upload boundary creates a [`docflow_core::Document`] and hands
//! its id to the [`Dispatcher`]. A worker picks it up and runs the
//! [`Processor`], which streams parser events through a [`BlockExtractor`],
//! feeds the resulting raw blocks to the [`Segmenter`], and persists the
//! segments in order while driving the document status machine.

pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod parser;
pub mod processor;
pub mod segmenter;

pub use dispatcher::{DispatchError, Dispatcher};
pub use error::PipelineError;
pub use extract::{BlockExtractor, ContentSink};
pub use parser::{DocumentParser, PlainTextParser};
pub use processor::{ProcessOutcome, Processor};
pub use segmenter::{Segmenter, MAX_SEGMENT_LENGTH};
