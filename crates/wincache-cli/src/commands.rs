use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{info, info_span};

use wincache_cli::script::parse_script;
use wincache_cli::session::{
    PageQuery, RecordSource, RecordStore, ReplayOutcome, load_config, load_records, parse_sort,
    reconcile_log, record_source, record_store, replay, show_page,
};
use wincache_cli::summary::{ChangeRow, PageView};
use wincache_core::QueryParams;
use wincache_core::model::ChangeLogEntry;

use crate::cli::{PageArgs, ReconcileArgs, ReplayArgs, StoreArgs};

pub fn run_page(args: &PageArgs) -> Result<PageView> {
    let span = info_span!("page", data = %args.store.data.display());
    let _guard = span.enter();

    let params = args
        .query
        .as_deref()
        .map(|query| QueryParams::from_pairs(split_query(query)))
        .transpose()
        .context("parse --query")?;
    let filter = args
        .filter
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("parse --filter as JSON")?;
    let sort = args.sort.as_deref().map(parse_sort).transpose()?;
    let query = PageQuery {
        params,
        filter,
        sort,
        page: args.page,
    };

    let (store, source) = open_store(&args.store)?;
    block_on(show_page(store, source, &query))?
}

pub fn run_replay(args: &ReplayArgs) -> Result<ReplayOutcome> {
    let span = info_span!("replay", script = %args.script.display());
    let _guard = span.enter();

    let contents = std::fs::read_to_string(&args.script)
        .with_context(|| format!("read {}", args.script.display()))?;
    let steps = parse_script(&contents)?;
    info!(steps = steps.len(), "script loaded");

    let (store, source) = open_store(&args.store)?;
    block_on(replay(store, source, steps))?
}

pub fn run_reconcile(args: &ReconcileArgs) -> Result<(usize, Vec<ChangeRow>)> {
    let contents = std::fs::read_to_string(&args.log)
        .with_context(|| format!("read {}", args.log.display()))?;
    let entries: Vec<ChangeLogEntry<Map<String, Value>>> = serde_json::from_str(&contents)
        .with_context(|| format!("parse change log in {}", args.log.display()))?;
    let rows = reconcile_log(&entries);
    info!(raw = entries.len(), reconciled = rows.len(), "change log reconciled");
    Ok((entries.len(), rows))
}

fn open_store(args: &StoreArgs) -> Result<(RecordStore, Arc<RecordSource>)> {
    let config = load_config(args.config.as_deref())?;
    let store = record_store(config, args.local_filter)?;
    let records = load_records(&args.data)?;
    info!(records = records.len(), "data loaded");
    Ok((store, record_source(records, args.latency_ms.map(Duration::from_millis))))
}

/// `a=1&b=2` into pairs; names without `=` get an empty value.
fn split_query(query: &str) -> impl Iterator<Item = (&str, &str)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    Ok(runtime.block_on(future))
}
