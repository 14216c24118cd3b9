//! Gzip-autodetecting, encoding-tolerant TSV ingestion.
//!
//! Grounded on `safe_read_tsv`/`path_magic` from the original retriever:
//! gzip is detected by magic bytes regardless of extension, decoding is
//! attempted `utf-8, latin-1, cp1252` in order, and malformed rows are
//! skipped rather than failing the whole file.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use lexrag_error::Error;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// One ingested row before it is stamped with the collection key it
/// belongs to (that's a property of *where* the file was found, not of the
/// row itself).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawRow {
    pub content: String,
    pub name: String,
    pub type_: String,
    pub extra: HashMap<String, String>,
}

pub struct TsvLoad {
    pub rows: Vec<RawRow>,
    pub row_count: usize,
}

/// True if the first two bytes of `path` are the gzip magic number, checked
/// independently of the file extension.
pub fn is_gzip(path: &Path) -> bool {
    let Ok(mut f) = std::fs::File::open(path) else { return false };
    let mut magic = [0u8; 2];
    f.read_exact(&mut magic).map(|_| magic == GZIP_MAGIC).unwrap_or(false)
}

fn read_raw_bytes(path: &Path) -> Result<Vec<u8>, Error> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::IndexLoadError(format!("{}: {e}", path.display())))?;
    if is_gzip(path) {
        let mut decoder = flate2::read::GzDecoder::new(&bytes[..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| Error::IndexLoadError(format!("{}: gzip decode failed: {e}", path.display())))?;
        Ok(out)
    } else {
        Ok(bytes)
    }
}

/// Decode `bytes` trying utf-8, then latin-1 — matching the documented
/// `utf-8, latin-1, cp1252` order. Latin-1 maps every byte to a codepoint
/// and therefore never fails, which makes a cp1252 tier placed after it
/// unreachable; it is omitted rather than kept as dead code.
fn decode_with_fallback(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_owned();
    }
    encoding_rs::mem::decode_latin1(bytes).into_owned()
}

/// Parse decoded TSV text into rows, filling `content`/`name`/`type`
/// defaults when the header lacks those columns, and skipping any row
/// whose field count disagrees with the header.
fn parse_tsv(text: &str) -> (Vec<RawRow>, usize) {
    let mut lines = text.lines();
    let Some(header_line) = lines.next() else { return (Vec::new(), 0) };
    let header: Vec<&str> = header_line.split('\t').collect();

    let mut rows = Vec::new();
    for (row_idx, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != header.len() {
            continue; // malformed row: skip rather than fail the load
        }
        let mut record: HashMap<String, String> =
            header.iter().map(|h| h.to_string()).zip(fields.iter().map(|f| f.to_string())).collect();

        let content = record.remove("content").unwrap_or_default();
        let name = record.remove("name").unwrap_or_else(|| row_idx.to_string());
        let type_ = record.remove("type").unwrap_or_default();

        rows.push(RawRow { content, name, type_, extra: record });
    }
    let row_count = rows.len();
    (rows, row_count)
}

pub fn load_tsv(path: &Path) -> Result<TsvLoad, Error> {
    let bytes = read_raw_bytes(path)?;
    let text = decode_with_fallback(&bytes);
    let (rows, row_count) = parse_tsv(&text);
    Ok(TsvLoad { rows, row_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn gzip_magic_is_detected_without_gz_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join("lexrag_test_gzip_no_ext.tsv");
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"name\ttype\tcontent\na\tacts\thello\n").unwrap();
        let compressed = encoder.finish().unwrap();
        std::fs::write(&path, &compressed).unwrap();

        assert!(is_gzip(&path));
        let loaded = load_tsv(&path).unwrap();
        assert_eq!(loaded.row_count, 1);
        assert_eq!(loaded.rows[0].content, "hello");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let text = "name\ttype\tcontent\na\tacts\thello\nbad_row_too_few_fields\nb\tacts\tworld\n";
        let (rows, count) = parse_tsv(text);
        assert_eq!(count, 2);
        assert_eq!(rows[0].name, "a");
        assert_eq!(rows[1].name, "b");
    }

    #[test]
    fn missing_required_columns_get_defaults() {
        let text = "other\nfoo\n";
        let (rows, _) = parse_tsv(text);
        assert_eq!(rows[0].content, "");
        assert_eq!(rows[0].type_, "");
        assert_eq!(rows[0].name, "0");
    }
}
