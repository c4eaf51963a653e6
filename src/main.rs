//! rustlitsearch - OpenAlex Literature Search
//!
//! Searches OpenAlex, normalizes the results into a flat table and exports
//! them as XLSX or CSV.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! rustlitsearch search "graph neural networks" --from 2020 --to 2023 --access open
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! rustlitsearch serve --port 3000
//! ```

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rustlitsearch::export::{self, ExportFormat, XLSX_MIME};
use rustlitsearch::model::DOCUMENT_TYPES;
use rustlitsearch::observer::{SearchObserver, TracingObserver};
use rustlitsearch::openalex::{OPENALEX_API_BASE, POLITE_EMAIL};
use rustlitsearch::{
    AccessPolicy, Pipeline, PipelineConfig, PublicationRecord, SearchRequest, SortCriterion,
    StopReason,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// OpenAlex literature search with spreadsheet export
#[derive(Parser)]
#[command(name = "rustlitsearch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging, smaller pages and request URL logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Contact e-mail sent to OpenAlex (polite pool)
    #[arg(long, global = true, env = "LITSEARCH_MAILTO", default_value = POLITE_EMAIL)]
    mailto: String,

    /// OpenAlex API base URL
    #[arg(long, global = true, env = "LITSEARCH_BASE_URL", default_value = OPENALEX_API_BASE)]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search OpenAlex and export the results
    Search {
        /// Search keywords
        keyword: String,

        /// Earliest publication year
        #[arg(long)]
        from: Option<i32>,

        /// Latest publication year
        #[arg(long)]
        to: Option<i32>,

        /// Document type filter (repeatable)
        #[arg(long = "type", default_value = "article", value_parser = DOCUMENT_TYPES.to_vec())]
        types: Vec<String>,

        /// Do not filter by document type
        #[arg(long, conflicts_with = "types")]
        all_types: bool,

        /// Access filter
        #[arg(long, value_enum, default_value_t = AccessPolicy::Any)]
        access: AccessPolicy,

        /// Primary sort criterion
        #[arg(long, value_enum, default_value_t = SortCriterion::Recency)]
        sort: SortCriterion,

        /// Secondary sort criterion
        #[arg(long, value_enum)]
        then: Option<SortCriterion>,

        /// Maximum number of results
        #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(1..))]
        max: u32,

        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Xlsx)]
        format: ExportFormat,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.log_json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = PipelineConfig {
        base_url: cli.base_url,
        mailto: cli.mailto,
        debug: cli.debug,
        ..Default::default()
    };

    match cli.command {
        Commands::Search {
            keyword,
            from,
            to,
            types,
            all_types,
            access,
            sort,
            then,
            max,
            format,
            output,
        } => {
            let types = if all_types { Vec::new() } else { types };
            let request = SearchRequest::new(keyword)
                .with_years(from, to)
                .with_document_types(types)
                .with_access(access)
                .with_sort(sort, then)
                .with_max_results(max as usize);
            run_search(config, request, format, output).await
        }
        Commands::Serve { port, host } => run_server(config, host, port).await,
    }
}

// ============================================================================
// Search
// ============================================================================

/// Terminal progress bar fed by the pipeline
struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .context("Invalid progress template")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SearchObserver for ProgressBarObserver {
    fn on_progress(&self, fraction: f64) {
        self.bar.set_position((fraction * 100.0).round() as u64);
    }

    fn on_status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn on_warning(&self, message: &str) {
        self.bar.println(format!("warning: {}", message));
    }

    fn on_error(&self, message: &str) {
        self.bar.println(format!("error: {}", message));
    }
}

async fn run_search(
    config: PipelineConfig,
    request: SearchRequest,
    format: ExportFormat,
    output_dir: PathBuf,
) -> Result<()> {
    let pipeline = Pipeline::new(config).context("Failed to set up OpenAlex client")?;

    let observer = ProgressBarObserver::new()?;
    let outcome = pipeline.run(&request, &observer).await;
    observer.finish();
    let outcome = outcome.context("Invalid search request")?;

    if outcome.stop.is_failure() {
        println!(
            "Search stopped early ({}); keeping {} results collected so far.",
            describe_stop(&outcome.stop),
            outcome.records.len()
        );
    }

    if outcome.records.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("{} relevant publications found!", outcome.records.len());
    print_preview(&outcome.records);

    let path = export::save(&output_dir, &outcome.records, format).context("Failed to write export")?;
    println!("\n✓ Saved: {}", path.display());
    Ok(())
}

fn describe_stop(stop: &StopReason) -> String {
    match stop {
        StopReason::MaxResults => "maximum reached".to_string(),
        StopReason::NoMoreItems => "no more items".to_string(),
        StopReason::LastPage => "last page".to_string(),
        StopReason::ProviderError { status } => format!("API error: Status {}", status),
        StopReason::Transport { message } => format!("network error: {}", message),
        StopReason::MalformedResponse { message } => format!("invalid response: {}", message),
    }
}

/// Print the first rows of the result table
fn print_preview(records: &[PublicationRecord]) {
    const PREVIEW_ROWS: usize = 10;

    println!("\n{:<6} {:>9}  {:<5}  Title", "Year", "Citations", "OA");
    for record in records.iter().take(PREVIEW_ROWS) {
        let title: String = record.title.chars().take(80).collect();
        println!(
            "{:<6} {:>9}  {:<5}  {}",
            record.year, record.citation_count, record.access_status, title
        );
    }
    if records.len() > PREVIEW_ROWS {
        println!("... and {} more", records.len() - PREVIEW_ROWS);
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(config: PipelineConfig, host: String, port: u16) -> Result<()> {
    info!(host = %host, port = port, "Starting HTTP server");

    let pipeline = Pipeline::new(config).context("Failed to set up OpenAlex client")?;
    let app_state = Arc::new(AppState { pipeline });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .route("/export", post(export_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

struct AppState {
    pipeline: Pipeline,
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Search response
#[derive(Debug, Serialize)]
struct SearchResponse {
    status: String,
    count: usize,
    stop: Option<StopReason>,
    records: Vec<PublicationRecord>,
}

/// Search endpoint handler
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<SearchResponse> {
    info!(keywords = %req.keywords, max_results = req.max_results, "Search request");

    match state.pipeline.run(&req, &TracingObserver).await {
        Ok(outcome) => Json(SearchResponse {
            status: "success".to_string(),
            count: outcome.records.len(),
            stop: Some(outcome.stop),
            records: outcome.records,
        }),
        Err(e) => {
            error!(error = %e, "Search failed");
            Json(SearchResponse {
                status: format!("error: {}", e),
                count: 0,
                stop: None,
                records: vec![],
            })
        }
    }
}

/// Export endpoint handler: runs the search and returns an XLSX download
async fn export_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    info!(keywords = %req.keywords, "Export request");

    let outcome = state
        .pipeline
        .run(&req, &TracingObserver)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if outcome.records.is_empty() {
        return Err((StatusCode::NOT_FOUND, "No results found.".to_string()));
    }

    let bytes = export::to_xlsx(&outcome.records).map_err(|e| {
        error!(error = %e, "Export failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let filename = export::export_filename(ExportFormat::Xlsx, Local::now());
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}
