//! # rustlitsearch
//!
//! OpenAlex literature search pipeline with spreadsheet export.
//!
//! ## Modules
//!
//! - [`query`] - Filter and sort expressions for the provider
//! - [`openalex`] - OpenAlex `/works` page client with simplified retry
//! - [`normalize`] - Raw work objects to flat publication records
//! - [`sort`] - Stable multi-key local re-sort
//! - [`pipeline`] - Paginated fetch loop tying the stages together
//! - [`export`] - XLSX / CSV export
//! - [`observer`] - Progress and status callbacks
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustlitsearch::{AccessPolicy, Pipeline, PipelineConfig, SearchRequest, SortCriterion};
//! use rustlitsearch::observer::TracingObserver;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let request = SearchRequest::new("graph neural networks")
//!         .with_years(Some(2020), Some(2023))
//!         .with_document_types(["article"])
//!         .with_access(AccessPolicy::OpenOnly)
//!         .with_sort(SortCriterion::Recency, Some(SortCriterion::CitationCount))
//!         .with_max_results(40);
//!
//!     let pipeline = Pipeline::new(PipelineConfig::default())?;
//!     let outcome = pipeline.run(&request, &TracingObserver).await?;
//!     println!("Found {} results", outcome.records.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod export;
pub mod model;
pub mod normalize;
pub mod observer;
pub mod openalex;
pub mod pipeline;
pub mod query;
pub mod sort;

pub use error::{LitSearchError, Result};
pub use model::{AccessPolicy, AccessStatus, PublicationRecord, SearchRequest, SortCriterion, SortPriority};
pub use pipeline::{Pipeline, PipelineConfig, SearchOutcome, StopReason};
