//! Reads portal screenshot files from `file://` URIs.

use std::{fs, thread, time::Duration};

use super::types::CaptureError;

/// Read image data from a `file://` URI and remove the file afterwards.
///
/// Handles percent-encoded paths and waits briefly for portals that flush
/// the file asynchronously.
pub fn read_image_from_uri(uri: &str) -> Result<Vec<u8>, CaptureError> {
    let url = url::Url::parse(uri)
        .map_err(|e| CaptureError::InvalidResponse(format!("invalid file URI '{uri}': {e}")))?;

    let path = url
        .to_file_path()
        .map_err(|_| CaptureError::InvalidResponse(format!("cannot convert URI to path: {uri}")))?;

    log::debug!("Reading screenshot from: {}", path.display());

    // Some portals write the file after emitting the Response signal.
    const MAX_ATTEMPTS: usize = 60;
    const ATTEMPT_DELAY_MS: u64 = 50;

    let mut data = Vec::new();
    for attempt in 0..MAX_ATTEMPTS {
        match fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => {
                data = bytes;
                break;
            }
            Ok(_) => {
                log::trace!(
                    "portal file {} still empty (attempt {}/{})",
                    path.display(),
                    attempt + 1,
                    MAX_ATTEMPTS
                );
            }
            Err(e) => {
                log::trace!(
                    "portal file {} not ready yet (attempt {}/{}): {}",
                    path.display(),
                    attempt + 1,
                    MAX_ATTEMPTS,
                    e
                );
            }
        }

        if attempt + 1 == MAX_ATTEMPTS {
            return Err(CaptureError::HostCapture(format!(
                "portal screenshot file {} not ready after {} attempts",
                path.display(),
                MAX_ATTEMPTS
            )));
        }

        thread::sleep(Duration::from_millis(ATTEMPT_DELAY_MS));
    }

    log::info!("Read {} bytes from portal screenshot", data.len());

    // Portal temp files accumulate otherwise.
    if let Err(e) = fs::remove_file(&path) {
        log::warn!("failed to remove portal temp file {}: {}", path.display(), e);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_and_removes_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("capture file.png");
        std::fs::write(&file_path, b"portal-bytes").unwrap();
        let uri = url::Url::from_file_path(&file_path).unwrap().to_string();

        let data = read_image_from_uri(&uri).expect("read succeeds");
        assert_eq!(data, b"portal-bytes");
        assert!(!file_path.exists(), "portal temp file should be deleted");
    }

    #[test]
    fn rejects_non_file_uri() {
        let err = read_image_from_uri("not-a-uri").unwrap_err();
        assert!(matches!(err, CaptureError::InvalidResponse(_)));
    }
}
