//! Remote fetchers, transformers, and the pipeline orchestrator for the
//! homedash integrations (music, trakt, feedly, goodreads).

pub mod client;
pub mod cloudinary;
pub mod error;
pub mod feedly;
pub mod goodreads;
pub mod lastfm;
pub mod music;
pub mod pipeline;
pub mod spotify;
pub mod trakt;
pub mod transform;

pub use client::{ApiClient, Endpoints};
pub use error::{ErrorKind, IntegrationError};
pub use pipeline::{build_snapshot, collect, run_all, run_and_log, run_pipeline, Clients, RunOutcome};
