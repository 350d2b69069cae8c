//! Order-CLI: run rank maintenance against a JSON collection
//!
//! Loads documents from a JSON array file into the in-memory store, runs one
//! operation through the request handler and prints the response.
//!
//! ```text
//! order-cli --data crops.json --filter '{"season":"s1"}' move --id <id> --to 2 --from 4
//! ```

pub mod telemetry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use order_maintainer::{
    Document, IdFormat, InMemoryCollectionStore, MaintainerConfig, OrderMaintainer, OrderRequest,
    OrderResponse, RequestHandler,
};

/// Order-CLI: dense rank maintenance over a JSON collection
#[derive(Parser, Debug)]
#[command(name = "order-cli")]
#[command(about = "Run order maintenance operations against a JSON document file")]
pub struct Args {
    /// JSON file holding an array of documents (each with an `_id`)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Partition filter as a JSON object
    #[arg(short, long, default_value = "{}")]
    pub filter: String,

    /// Name of the rank field
    #[arg(short = 'o', long, default_value = "order")]
    pub order_field: String,

    /// Record identifier shape (`object_id` or `opaque`); overrides ORDER_ID_FORMAT
    #[arg(long)]
    pub id_format: Option<IdFormat>,

    /// Write the resulting documents back to the data file
    #[arg(long)]
    pub write: bool,

    /// Print the resulting documents after the response
    #[arg(long)]
    pub dump: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "ORDER_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "ORDER_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Highest rank in the partition
    Max,
    /// Rank for a new record (max + 1)
    Next,
    /// Shift peers so a record can move, then set its own rank
    Move {
        #[arg(long)]
        id: String,
        /// New rank
        #[arg(long)]
        to: i64,
        /// Current rank
        #[arg(long)]
        from: i64,
    },
    /// Close the gap of a record, then delete it
    Remove {
        #[arg(long)]
        id: String,
        /// Rank of the record being removed
        #[arg(long)]
        order: i64,
    },
    /// Rewrite the partition as 1..N
    Reorder,
    /// Report gaps and duplicates
    Inspect,
}

impl Command {
    /// Build the loosely-typed request the handler expects.
    pub fn to_request(&self, filter: &Value, order_field: &str) -> Result<OrderRequest> {
        let query = json!({ "query_obj": filter, "order_field": order_field });
        let mut request = match self {
            Command::Max => json!({ "operation": "max_order" }),
            Command::Next => json!({ "operation": "next_order" }),
            Command::Move { id, to, from } => json!({
                "operation": "update_order",
                "_id": id,
                "current_order": to,
                "past_order": from,
            }),
            Command::Remove { id, order } => json!({
                "operation": "remove_except_deleted",
                "_id": id,
                "order": order,
            }),
            Command::Reorder => json!({ "operation": "reorder_all" }),
            Command::Inspect => json!({ "operation": "inspect" }),
        };
        if let (Some(target), Some(extra)) = (request.as_object_mut(), query.as_object()) {
            target.extend(extra.clone());
        }
        serde_json::from_value(request).context("building request")
    }
}

/// Read a JSON array of documents.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Write documents back as a pretty JSON array.
pub fn save_documents(path: &Path, documents: &[Document]) -> Result<()> {
    let raw = serde_json::to_string_pretty(documents)?;
    std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
}

/// Environment configuration with command-line overrides applied.
pub fn config_for(args: &Args) -> MaintainerConfig {
    let mut config = MaintainerConfig::from_env();
    if let Some(format) = args.id_format {
        config.id_format = format;
    }
    config
}

/// Run one command against the loaded documents.
///
/// The caller-side steps the maintainer leaves to its users (writing the
/// moved record's own rank, deleting the removed record) are done here.
pub async fn run(
    args: &Args,
    config: MaintainerConfig,
    documents: Vec<Document>,
) -> Result<(OrderResponse, Vec<Document>)> {
    let filter: Value = serde_json::from_str(&args.filter).context("parsing --filter")?;
    let store = Arc::new(InMemoryCollectionStore::with_documents(documents));
    let handler = RequestHandler::new(OrderMaintainer::with_config(Arc::clone(&store), config));

    let request = args.command.to_request(&filter, &args.order_field)?;
    let response = handler.handle(request).await;

    if !response.failed {
        match &args.command {
            Command::Move { id, to, .. } => set_rank(&store, id, &args.order_field, *to),
            Command::Remove { id, .. } => remove_document(&store, id),
            _ => {}
        }
    }

    Ok((response, store.documents()))
}

fn set_rank(store: &InMemoryCollectionStore, id: &str, field: &str, rank: i64) {
    if let Some(mut document) = store.documents().into_iter().find(|d| d.id.as_str() == id) {
        document.fields.insert(field.to_string(), rank.into());
        store.insert(document);
    }
}

fn remove_document(store: &InMemoryCollectionStore, id: &str) {
    if let Some(document) = store.documents().into_iter().find(|d| d.id.as_str() == id) {
        store.remove(&document.id);
    }
}
