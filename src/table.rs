use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::parser::record::COLUMNS;
use crate::parser::LegislatorRecord;

/// Rows in the order their urls were processed.
#[derive(Debug, Default)]
pub struct ResultTable {
    rows: Vec<LegislatorRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LegislatorRecord) {
        self.rows.push(record);
    }

    pub fn rows(&self) -> &[LegislatorRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Write to `path`, replacing whatever is there.
    pub fn write_csv(&self, path: &Path, delimiter: u8) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create output file {:?}", path))?;
        self.write_to(file, delimiter)
            .with_context(|| format!("Failed to write output file {:?}", path))?;
        info!("Wrote {} rows to {:?}", self.rows.len(), path);
        Ok(())
    }

    /// Index column first (blank header), then the record columns.
    pub fn write_to<W: Write>(&self, sink: W, delimiter: u8) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(sink);

        writer.write_record(std::iter::once("").chain(COLUMNS))?;
        for (i, row) in self.rows().iter().enumerate() {
            let index = i.to_string();
            writer.write_record(std::iter::once(index.as_str()).chain(row.fields()))?;
        }
        writer.flush()?;
        Ok(())
    }
}
