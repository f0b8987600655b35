//! Client-side reassembly of `text/event-stream` chat replies.
//!
//! Bytes go through [`framer::LineFramer`] (line splitting that survives
//! arbitrary chunk boundaries), [`record`] (classification and decoding of
//! `data:` payloads) and [`reassembler`] (delivery, held records,
//! cancellation).

pub mod cancel;
pub mod client;
pub mod framer;
pub mod reassembler;
pub mod record;

pub use cancel::CancelToken;
pub use client::{ChatStreamClient, StreamError};
pub use reassembler::{
    reassemble, Callbacks, DeltaSink, Reassembler, StreamOutcome, StreamSummary,
};
