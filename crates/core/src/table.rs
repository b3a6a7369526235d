//! Flattening keys and entities into table rows
//!
//! Each record becomes one [`TableEntry`]: a header list and a parallel row
//! of cells. [`group_tables`] then packs consecutive entries with the same
//! header into one [`Table`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::Result;
use crate::explain::ExplainMetrics;
use crate::json::format_timestamp;
use crate::key::{Identifier, Key};
use crate::value::{Entity, Property, Value};

/// One record: `header[i]` names `row[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableEntry {
    pub header: Vec<String>,
    pub row: Vec<String>,
}

impl TableEntry {
    fn push(&mut self, header: impl Into<String>, cell: impl Into<String>) {
        self.header.push(header.into());
        self.row.push(cell.into());
    }

    /// Root first: `Namespace` (when set), `Kind`, then `ID` or `Name` for
    /// each level. Incomplete levels contribute no identifier column.
    pub fn from_key(key: &Key) -> Self {
        let mut entry = TableEntry::default();
        for level in key.path() {
            if !level.namespace().is_empty() {
                entry.push("Namespace", level.namespace());
            }
            entry.push("Kind", level.kind());
            match level.identifier() {
                Some(Identifier::Id(id)) => entry.push("ID", id.to_string()),
                Some(Identifier::Name(name)) => entry.push("Name", name.as_str()),
                None => {}
            }
        }
        entry
    }

    /// Key columns, then properties sorted by name, then `Version`,
    /// `CreateTime` and `UpdateTime` when metadata is present.
    pub fn from_entity(entity: &Entity) -> Self {
        let mut entry = entity.key.as_ref().map(TableEntry::from_key).unwrap_or_default();
        entry.push_properties("", &entity.properties);
        if let Some(metadata) = &entity.metadata {
            entry.push("Version", metadata.version.to_string());
            let cell = |ts: &Option<chrono::DateTime<chrono::Utc>>| {
                ts.as_ref().map(format_timestamp).unwrap_or_default()
            };
            entry.push("CreateTime", cell(&metadata.create_time));
            entry.push("UpdateTime", cell(&metadata.update_time));
        }
        entry
    }

    /// `IndexesUsed[i].<field>` for each planner index, then
    /// `ResultsReturned`, `ExecutionDuration`, `ReadOperations`, and
    /// `DebugStats` as compact JSON when reported.
    pub fn from_explain(metrics: &ExplainMetrics) -> Result<Self> {
        let mut entry = TableEntry::default();
        if let Some(plan) = &metrics.plan_summary {
            for (i, index) in plan.indexes_used.iter().enumerate() {
                for (field, value) in index.iter().flatten() {
                    let cell = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    entry.push(format!("IndexesUsed[{}].{}", i, field), cell);
                }
            }
        }
        let stats = metrics.execution_stats.clone().unwrap_or_default();
        entry.push("ResultsReturned", stats.results_returned.to_string());
        entry.push(
            "ExecutionDuration",
            stats.duration().map(|d| format!("{:?}", d)).unwrap_or_default(),
        );
        entry.push("ReadOperations", stats.read_operations.to_string());
        if let Some(debug) = &stats.debug_stats {
            entry.push("DebugStats", serde_json::to_string(debug)?);
        }
        Ok(entry)
    }

    fn push_properties(&mut self, prefix: &str, properties: &[Property]) {
        let mut sorted: Vec<&Property> = properties.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        for property in sorted {
            self.push_value(format!("{}{}", prefix, property.name), &property.value);
        }
    }

    /// Nested entities prefix their children with `name.`, array elements
    /// become `name[i]`.
    fn push_value(&mut self, name: String, value: &Value) {
        match value {
            Value::Array(values) => {
                for (i, element) in values.iter().enumerate() {
                    self.push_value(format!("{}[{}]", name, i), element);
                }
            }
            Value::Entity(properties) => self.push_properties(&format!("{}.", name), properties),
            scalar => self.push(name, format_cell(scalar)),
        }
    }
}

/// Display form of a scalar cell.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Blob(bytes) => format!("b64\"{}\"", URL_SAFE_NO_PAD.encode(bytes)),
        Value::Bool(b) => b.to_string(),
        Value::Timestamp(ts) => format_timestamp(ts),
        Value::Float(f) => f.to_string(),
        Value::Geo(geo) => format!("geo(lat: {:.6}, lng: {:.6})", geo.lat, geo.lng),
        Value::Int(i) => i.to_string(),
        Value::Key(key) => key.to_literal(),
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(values) => format!("[{} values]", values.len()),
        Value::Entity(properties) => format!("{{{} properties}}", properties.len()),
    }
}

// ============================================================================
// Grouping
// ============================================================================

/// Rows sharing one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn start(entry: TableEntry) -> Self {
        Table {
            header: entry.header,
            rows: vec![entry.row],
        }
    }
}

/// Iterator returned by [`group_tables`].
pub struct GroupTables<I> {
    entries: I,
    current: Option<Table>,
    failed: bool,
}

/// Pack consecutive entries with identical headers into tables.
///
/// A header change closes the current table and starts a new one. An error
/// is yielded in place of the table being built and ends the iteration.
pub fn group_tables<I>(entries: I) -> GroupTables<I::IntoIter>
where
    I: IntoIterator<Item = Result<TableEntry>>,
{
    GroupTables {
        entries: entries.into_iter(),
        current: None,
        failed: false,
    }
}

impl<I> Iterator for GroupTables<I>
where
    I: Iterator<Item = Result<TableEntry>>,
{
    type Item = Result<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let entry = match self.entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    self.failed = true;
                    self.current = None;
                    return Some(Err(e));
                }
                None => return self.current.take().map(Ok),
            };

            match self.current.as_mut() {
                Some(table) if table.header == entry.header => table.rows.push(entry.row),
                Some(_) => {
                    let completed = self.current.replace(Table::start(entry));
                    return completed.map(Ok);
                }
                None => self.current = Some(Table::start(entry)),
            }
        }
    }
}
