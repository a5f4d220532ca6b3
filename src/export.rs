use tracing::debug;

use crate::error::Result;
use crate::io::excel_write;
use crate::table::Table;

/// File name offered for the scored spreadsheet.
pub const DOWNLOAD_FILE_NAME: &str = "hasil_prediksi_final.xlsx";
/// MIME type of the download.
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One-shot download artifact. The bytes only ever live in memory here.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encodes the full table as an xlsx download.
pub fn export(table: &Table, file_name: &str) -> Result<Download> {
    let bytes = excel_write::write_table_to_buffer(table)?;
    debug!(byte_count = bytes.len(), file_name, "export buffer encoded");
    Ok(Download {
        file_name: file_name.to_string(),
        mime_type: XLSX_MIME_TYPE,
        bytes,
    })
}
