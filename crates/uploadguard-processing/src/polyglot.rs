//! Polyglot detection.
//!
//! A file is sniffed again at five checkpoints spread over the whole buffer.
//! Every local detection must be compatible with the type established for the
//! whole file; the first one that is not fails validation. Windows past the
//! head are sniffed with [`SignatureSniffer::sniff_embedded`].

use uploadguard_core::ValidationError;

use crate::compatibility::compatible;
use crate::sniffer::SignatureSniffer;

/// Bytes sniffed at each checkpoint.
pub const CHECKPOINT_WINDOW: usize = 2048;

/// Start offsets: head, 25%, 50%, 75%, and the final window.
pub fn checkpoints(len: usize) -> [usize; 5] {
    [
        0,
        len / 4,
        len / 2,
        len / 4 * 3,
        len.saturating_sub(CHECKPOINT_WINDOW),
    ]
}

/// Check every checkpoint of `bytes` against `whole_mime`.
pub fn check(
    sniffer: &dyn SignatureSniffer,
    bytes: &[u8],
    whole_mime: &str,
) -> Result<(), ValidationError> {
    let mut seen = Vec::with_capacity(5);

    for offset in checkpoints(bytes.len()) {
        if offset >= bytes.len() || seen.contains(&offset) {
            continue;
        }
        seen.push(offset);

        let end = bytes.len().min(offset + CHECKPOINT_WINDOW);
        let window = &bytes[offset..end];
        let local = if offset == 0 {
            sniffer.sniff(window)
        } else {
            sniffer.sniff_embedded(window)
        }
        .map_err(|e| ValidationError::DetectionFailed(e.to_string()))?;

        if !compatible(whole_mime, &local) {
            tracing::debug!(
                offset,
                expected = %whole_mime,
                found = %local,
                "Checkpoint type conflicts with whole-file type"
            );
            return Err(ValidationError::PolyglotDetected {
                offset,
                expected: whole_mime.to_string(),
                found: local,
            });
        }
    }

    Ok(())
}
