//! Zip archive builder
//!
//! Turns a list of (name, bytes) pairs into an in-memory zip. Entry names
//! are reduced to their base name so user-controlled display names cannot
//! escape the archive root.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::{AppError, Result};

/// Sanitize an entry name to prevent path traversal. Strips path components
/// like `../`, keeping only the base name.
pub fn sanitize_entry_name(name: &str, fallback: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Disambiguate an entry name against the names already taken, the way a
/// file manager does: `report.pdf`, `report (2).pdf`, `report (3).pdf`.
/// Zip readers silently collapse duplicate entries, so every name in one
/// archive has to be unique.
pub fn unique_entry_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n = 2;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Sanitize a folder name into a safe attachment filename stem.
pub fn sanitize_archive_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_').to_string();
    if stem.is_empty() {
        "folder".to_string()
    } else {
        stem
    }
}

/// Build a zip archive from (entry name, content) pairs.
pub fn build_zip(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (index, (name, data)) in entries.iter().enumerate() {
            let safe_name = sanitize_entry_name(name, &format!("unnamed_{}", index));
            zip.start_file(&safe_name, options).map_err(|e| {
                AppError::Internal(format!("failed to add zip entry {}: {}", safe_name, e))
            })?;
            zip.write_all(data).map_err(|e| {
                AppError::Internal(format!("failed to write zip entry {}: {}", safe_name, e))
            })?;
        }

        zip.finish()
            .map_err(|e| AppError::Internal(format!("failed to finalize zip: {}", e)))?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn entry_names_cannot_traverse() {
        assert_eq!(sanitize_entry_name("../../etc/passwd", "fb"), "passwd");
        assert_eq!(sanitize_entry_name("..", "fb"), "fb");
        assert_eq!(sanitize_entry_name("", "fb"), "fb");
        assert_eq!(sanitize_entry_name("report.pdf", "fb"), "report.pdf");
    }

    #[test]
    fn duplicate_entry_names_get_numbered_suffixes() {
        let mut used = HashSet::new();
        assert_eq!(unique_entry_name("report.pdf", &mut used), "report.pdf");
        assert_eq!(unique_entry_name("report.pdf", &mut used), "report (2).pdf");
        assert_eq!(unique_entry_name("report.pdf", &mut used), "report (3).pdf");
        assert_eq!(unique_entry_name("notes", &mut used), "notes");
        assert_eq!(unique_entry_name("notes", &mut used), "notes (2)");
        // A leading dot is a hidden file, not an extension
        assert_eq!(unique_entry_name(".env", &mut used), ".env");
        assert_eq!(unique_entry_name(".env", &mut used), ".env (2)");
    }

    #[test]
    fn archive_stem_is_filesystem_safe() {
        assert_eq!(sanitize_archive_stem("Laporan Q3 / 2024"), "Laporan_Q3___2024");
        assert_eq!(sanitize_archive_stem("???"), "folder");
        assert_eq!(sanitize_archive_stem("docs-2024"), "docs-2024");
    }

    #[test]
    fn built_zip_contains_all_entries() {
        let entries = vec![
            ("a.txt".to_string(), b"alpha".to_vec()),
            ("b.txt".to_string(), b"beta".to_vec()),
        ];
        let bytes = build_zip(&entries).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("a.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "alpha");
    }

    #[test]
    fn empty_entry_list_still_yields_a_valid_zip() {
        let bytes = build_zip(&[]).unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
