//! CsvSink - appends rows to a CSV file

use contracts::{ContractError, RowSink, RowSchema, TelemetryRow, MISSING};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Default output path when the sink params carry none
const DEFAULT_PATH: &str = "openvr_data.csv";

/// Serializes rows into CSV lines for one session
///
/// Every line has the same column count in the same order, per the
/// session-wide schema. Missing numeric values print as NaN.
#[derive(Debug, Clone)]
pub struct RowFormatter {
    schema: RowSchema,
    precision: usize,
    separator: String,
}

impl RowFormatter {
    pub fn new(schema: RowSchema, precision: usize, separator: impl Into<String>) -> Self {
        Self {
            schema,
            precision,
            separator: separator.into(),
        }
    }

    /// Header line, without trailing newline
    pub fn header(&self) -> String {
        self.schema.column_names().join(&self.separator)
    }

    /// One data or message line, without trailing newline
    pub fn format_row(&self, row: &TelemetryRow) -> String {
        let mut fields: Vec<String> =
            Vec::with_capacity(self.schema.column_count());

        fields.push(row.device.clone());
        fields.push(if row.message.is_empty() {
            String::new()
        } else {
            format!("\"{}\"", row.message.replace('"', "\"\""))
        });
        fields.push(row.device_id.to_string());

        for t in [row.time_ovr, row.time_sys, row.rtime_ovr, row.rtime_sys] {
            fields.push(self.number(t));
        }
        for p in row.position {
            fields.push(self.number(p));
        }
        for r in row.rotation {
            fields.push(self.number(r));
        }
        if self.schema.has_buttons {
            for b in row.buttons {
                fields.push(self.number(b));
            }
        }
        for slot in 0..self.schema.hand_joints * contracts::JOINT_FIELDS {
            fields.push(self.number(row.hand.get(slot).copied().unwrap_or(MISSING)));
        }

        fields.join(&self.separator)
    }

    fn number(&self, value: f64) -> String {
        // {:.prec$} renders f64::NAN as "NaN"
        format!("{value:.prec$}", prec = self.precision)
    }
}

/// Sink that appends CSV lines to a file
///
/// The header is written once, when the sink opens an empty file. Opening
/// an existing non-empty file resumes appending without a second header.
pub struct CsvSink {
    name: String,
    path: PathBuf,
    formatter: RowFormatter,
    writer: Option<BufWriter<File>>,
}

impl CsvSink {
    /// Create a new CsvSink, opening (or creating) the output file
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        formatter: RowFormatter,
    ) -> std::io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let empty = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);

        if empty {
            writeln!(writer, "{}", formatter.header())?;
            writer.flush()?;
        }
        debug!(path = %path.display(), fresh = empty, "csv sink opened");

        Ok(Self {
            name: name.into(),
            path,
            formatter,
            writer: Some(writer),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        formatter: RowFormatter,
    ) -> std::io::Result<Self> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH));
        Self::new(name, path, formatter)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl RowSink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, row: &TelemetryRow) -> Result<(), ContractError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ContractError::sink_write(&self.name, "sink already closed"))?;

        let line = self.formatter.format_row(row);
        writeln!(writer, "{line}")
            .and_then(|()| writer.flush())
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    /// Idempotent: a second close is a no-op.
    #[instrument(name = "csv_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
            debug!(path = %self.path.display(), "csv sink closed");
        }
        Ok(())
    }
}
