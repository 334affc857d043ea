//! Bulk and single-record export.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use log::info;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use super::{GalleryError, Screenshot};

/// Writes every record into a ZIP archive at `out`.
///
/// Entry names derive from each record's name and format; collisions get a
/// numeric suffix so no entry silently overwrites another.
pub fn export_zip(records: &[Screenshot], out: &Path) -> Result<usize, GalleryError> {
    if records.is_empty() {
        return Err(GalleryError::Empty);
    }

    let file = File::create(out)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used: HashSet<String> = HashSet::new();
    for record in records {
        let entry = unique_entry_name(record, &used);
        used.insert(entry.clone());

        writer.start_file(entry, options)?;
        writer.write_all(&record.data)?;
    }

    writer.finish()?;
    info!("exported {} screenshot(s) to {}", records.len(), out.display());
    Ok(records.len())
}

/// Writes one record's image bytes to `out`.
pub fn save_record(record: &Screenshot, out: &Path) -> Result<(), GalleryError> {
    fs::write(out, &record.data)?;
    info!(
        "saved screenshot '{}' to {} ({} bytes)",
        record.name,
        out.display(),
        record.data.len()
    );
    Ok(())
}

fn unique_entry_name(record: &Screenshot, used: &HashSet<String>) -> String {
    let base = record.file_name();
    if !used.contains(&base) {
        return base;
    }

    let ext = record.format.extension();
    for n in 1.. {
        let candidate = format!("{}-{}.{}", record.name, n, ext);
        if !used.contains(&candidate) {
            return candidate;
        }
    }
    unreachable!("suffix search is unbounded")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureResult, ImageFormat};
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn sample(name: &str, data: Vec<u8>) -> Screenshot {
        Screenshot::from_capture(
            CaptureResult {
                data,
                format: ImageFormat::Png,
                width: 1,
                height: 1,
            },
            name.to_string(),
        )
    }

    #[test]
    fn zip_contains_every_record_with_deduped_names() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("screenshots.zip");

        let records = vec![
            sample("shot", vec![1]),
            sample("shot", vec![2]),
            sample("other", vec![3]),
        ];
        let count = export_zip(&records, &out).unwrap();
        assert_eq!(count, 3);

        let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["other.png", "shot-1.png", "shot.png"]);
    }

    #[test]
    fn empty_gallery_does_not_export() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("screenshots.zip");
        assert!(matches!(export_zip(&[], &out), Err(GalleryError::Empty)));
        assert!(!out.exists());
    }

    #[test]
    fn save_record_writes_raw_bytes() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("one.png");
        let record = sample("one", vec![4, 5, 6]);

        save_record(&record, &out).unwrap();
        assert_eq!(fs::read(&out).unwrap(), vec![4, 5, 6]);
    }
}
