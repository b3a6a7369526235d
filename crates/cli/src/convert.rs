//! Command execution over stdin/stdout-like streams.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use dutil_core::{
    group_tables, read_json_stream, Entity, ExplainMetrics, Key, KeyFormat, KeyReader, KeyWriter, TableEntry,
};
use tracing::debug;

use crate::format::draw_table;
use crate::parse::TableSource;

/// `convert key`: re-encode every key of `input` into `to`.
pub fn convert_key<R: Read, W: Write>(
    from: Option<KeyFormat>,
    to: KeyFormat,
    namespace: &str,
    input: R,
    output: W,
) -> Result<()> {
    let mut writer = KeyWriter::new(to, output);
    match from {
        Some(format) => copy_keys(KeyReader::new(format, input, namespace), &mut writer)?,
        None => copy_keys(KeyReader::auto(input, namespace)?, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn copy_keys<R: Read, W: Write>(reader: KeyReader<R>, writer: &mut KeyWriter<W>) -> Result<()> {
    debug!(format = %reader.format(), "reading keys");
    for (i, key) in reader.enumerate() {
        let key = key.with_context(|| format!("key #{}", i + 1))?;
        writer.write(&key)?;
    }
    Ok(())
}

/// `convert table`: group records with the same columns into text tables.
pub fn convert_table<R: Read, W: Write>(from: TableSource, input: R, output: W) -> Result<()> {
    match from {
        TableSource::Key => write_tables(
            read_json_stream::<_, Key>(input).map(|key| key.map(|k| TableEntry::from_key(&k))),
            output,
        ),
        TableSource::Entity => write_tables(
            read_json_stream::<_, Entity>(input)
                .map(|entity| entity.map(|e| TableEntry::from_entity(&e))),
            output,
        ),
        TableSource::Explain => write_tables(
            read_json_stream::<_, ExplainMetrics>(input)
                .map(|metrics| metrics.and_then(|m| TableEntry::from_explain(&m))),
            output,
        ),
    }
}

fn write_tables<I, W>(entries: I, mut output: W) -> Result<()>
where
    I: Iterator<Item = dutil_core::Result<TableEntry>>,
    W: Write,
{
    for table in group_tables(entries) {
        let table = table?;
        writeln!(output, "{}", draw_table(&table))?;
    }
    output.flush()?;
    Ok(())
}

/// `key`: parse command-line keys (opaque first, literal second) and print
/// them in `to`.
pub fn render_keys<W: Write>(keys: &[String], to: KeyFormat, namespace: &str, output: W) -> Result<()> {
    let parsed = keys
        .iter()
        .map(|text| Key::parse(text, namespace).with_context(|| format!("invalid key {:?}", text)))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = KeyWriter::new(to, output);
    for key in &parsed {
        writer.write(key)?;
    }
    writer.flush()?;
    Ok(())
}
