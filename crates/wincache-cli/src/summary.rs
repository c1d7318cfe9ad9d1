//! Table output.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use wincache_core::model::{ChangeType, EntityId, LoadStatus};
use wincache_core::record::ID_FIELD;
use wincache_core::{PageInfo, QueryParams, Record};

/// The visible page of a store after a command ran.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub rows: Vec<Record>,
    pub info: Option<PageInfo>,
    pub status: LoadStatus,
    /// Records held in the cache, across pages.
    pub cached: usize,
    pub selected: Vec<EntityId>,
    /// Parameters that restore this view.
    pub query: QueryParams,
}

/// One change log entry joined with the record it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRow {
    pub id: EntityId,
    pub change_type: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

pub fn print_page(view: &PageView) {
    match &view.info {
        Some(info) => {
            let total = info
                .total
                .map_or_else(|| "?".to_string(), |total| total.to_string());
            let pages = info
                .pages_count
                .map_or_else(|| "?".to_string(), |count| count.to_string());
            println!(
                "Page {} of {pages} ({total} records, {} cache, {} cached)",
                info.page_index.saturating_add(1),
                info.cache_type.as_str(),
                view.cached
            );
        }
        None => println!("{} records", view.rows.len()),
    }
    if let LoadStatus::Fail { error } = &view.status {
        eprintln!(
            "Last load failed: {}",
            error.as_deref().unwrap_or("unknown error")
        );
    }

    let columns = record_columns(&view.rows);
    let mut table = Table::new();
    table.set_header(columns.iter().map(|column| header_cell(column)));
    apply_summary_table_style(&mut table);
    for row in &view.rows {
        let selected = row
            .get(ID_FIELD)
            .and_then(|id| serde_json::from_value::<EntityId>(id.clone()).ok())
            .is_some_and(|id| view.selected.contains(&id));
        table.add_row(
            columns
                .iter()
                .map(|column| value_cell(row.get(column), selected)),
        );
    }
    println!("{table}");
    let query = query_string(&view.query);
    if !query.is_empty() {
        println!("Query: {query}");
    }
}

/// `name=value` pairs joined with `&`, unescaped.
pub fn query_string(params: &QueryParams) -> String {
    params
        .to_pairs()
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn print_changes(title: &str, rows: &[ChangeRow]) {
    println!();
    println!("{title}:");
    if rows.is_empty() {
        println!("(none)");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Id"),
        header_cell("Change"),
        header_cell("Payload"),
    ]);
    apply_table_style(&mut table);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for (index, row) in rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&row.id),
            change_cell(row.change_type),
            row.payload
                .as_ref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

/// Column names in first-seen order, `id` first.
pub fn record_columns(rows: &[Record]) -> Vec<String> {
    let mut columns = vec![ID_FIELD.to_string()];
    for row in rows {
        for key in row.0.keys() {
            if !columns.iter().any(|column| column == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(value: Option<&Value>, selected: bool) -> Cell {
    let cell = match value {
        None | Some(Value::Null) => return dim_cell("-"),
        Some(Value::String(text)) => Cell::new(text),
        Some(Value::Number(number)) => Cell::new(number).set_alignment(CellAlignment::Right),
        Some(other) => Cell::new(other),
    };
    if selected {
        cell.add_attribute(Attribute::Bold).fg(Color::Green)
    } else {
        cell
    }
}

fn change_cell(change_type: ChangeType) -> Cell {
    let color = match change_type {
        ChangeType::Created => Color::Green,
        ChangeType::Updated => Color::Yellow,
        ChangeType::Deleted => Color::Red,
    };
    Cell::new(change_type.as_str()).fg(color)
}

fn dim_cell(value: &str) -> Cell {
    Cell::new(value).add_attribute(Attribute::Dim)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn columns_keep_first_seen_order_with_id_first() {
        let rows: Vec<Record> = serde_json::from_value(json!([
            {"name": "Ada", "id": 1},
            {"id": 2, "team": "blue", "name": "Grace"}
        ]))
        .unwrap();
        assert_eq!(record_columns(&rows), vec!["id", "name", "team"]);
    }
}
