//! Write pipeline
//!
//! Body encodings and response parsing for single writes, plus the batch
//! helpers that keep per-record attribution when a provider reports partial
//! failures.

mod batch;
mod single;

pub use batch::{
    align_results, apply_all_or_none, partial_failure_predicate, split_batch,
    unstructured_failure, write_in_chunks, Alignment,
};
pub use single::{parse_write_response, BodyEncoding};
