//! Tabular export of search results.
//!
//! XLSX is the default download format; CSV is offered for plain-text
//! tooling. Both use the column order of [`RECORD_COLUMNS`].

use crate::error::Result;
use crate::model::{PublicationRecord, RECORD_COLUMNS};
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// MIME type of the XLSX download
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Export file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Timestamped file name, e.g. `literature_search_20240131_154501.xlsx`
pub fn export_filename(format: ExportFormat, at: DateTime<Local>) -> String {
    format!(
        "literature_search_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Render records into an in-memory XLSX workbook
pub fn to_xlsx(records: &[PublicationRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Publications")?;

    for (col, name) in RECORD_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, &record.title)?;
        sheet.write_string(row, 1, &record.authors)?;
        sheet.write_number(row, 2, f64::from(record.year))?;
        sheet.write_string(row, 3, &record.source)?;
        sheet.write_string(row, 4, &record.document_type)?;
        sheet.write_number(row, 5, record.citation_count as f64)?;
        sheet.write_string(row, 6, record.access_status.to_string())?;
        sheet.write_string(row, 7, &record.identifier)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write records as CSV with a header row
pub fn write_csv<W: Write>(writer: W, records: &[PublicationRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(RECORD_COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render records in `format` into a byte buffer
pub fn to_bytes(records: &[PublicationRecord], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Xlsx => to_xlsx(records),
        ExportFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(&mut buf, records)?;
            Ok(buf)
        }
    }
}

/// Save records into `dir` under a timestamped name; returns the written path
pub fn save(dir: &Path, records: &[PublicationRecord], format: ExportFormat) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(format, Local::now()));
    let bytes = to_bytes(records, format)?;
    std::fs::write(&path, bytes)?;
    info!(path = %path.display(), rows = records.len(), "Saved export");
    Ok(path)
}
