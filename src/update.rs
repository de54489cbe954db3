//! In-place rewriting of a snapshot's literal block.
//!
//! The updater re-reads the whole file, re-locates the block from the call
//! line, and writes the whole file back with the block replaced. The
//! read/modify/write is not atomic and takes no lock: two processes updating
//! snapshots in one file can race and corrupt each other's edits, so
//! update-mode runs should be serialized externally.

use std::fs;

use crate::block;
use crate::diagnostics::{io_error, SeamError};
use crate::engine::SourceLocation;

/// Result of a completed rewrite.
#[derive(Debug)]
pub struct Rewrite {
    /// The full new file content, as written to disk.
    pub file_text: String,
    /// Whether the call line still carried the call-site marker; forwarded
    /// from the locator for the caller to surface as a warning.
    pub call_marker_seen: bool,
}

/// Replaces the literal block at `location` with `new_body`, re-emitted
/// line by line under the block's original indentation.
///
/// Files over `max_source_bytes` are refused before the read.
pub fn rewrite(
    location: &SourceLocation,
    new_body: &str,
    max_source_bytes: u64,
) -> Result<Rewrite, SeamError> {
    let path = &location.file;
    let display = path.display().to_string();

    let metadata = fs::metadata(path)
        .map_err(|e| io_error(format!("failed to stat '{}': {}", display, e), Some(e)))?;
    if metadata.len() > max_source_bytes {
        return Err(io_error(
            format!(
                "'{}' is {} bytes, over the {} byte rewrite ceiling",
                display,
                metadata.len(),
                max_source_bytes
            ),
            None,
        ));
    }

    let source = fs::read_to_string(path)
        .map_err(|e| io_error(format!("failed to read '{}': {}", display, e), Some(e)))?;
    let located = block::locate(&source, &display, location.line)?;
    let span = located.span;

    let old_block = &source[span.start..span.end];
    let indent: String = old_block.chars().take_while(|&c| c == ' ').collect();
    let mut new_block = block::emit(new_body, &indent);
    if !old_block.ends_with('\n') {
        // Block ran to end of file without a trailing newline; keep that shape.
        new_block.pop();
    }

    let mut file_text =
        String::with_capacity(source.len() - old_block.len() + new_block.len());
    file_text.push_str(&source[..span.start]);
    file_text.push_str(&new_block);
    file_text.push_str(&source[span.end..]);

    fs::write(path, &file_text)
        .map_err(|e| io_error(format!("failed to write '{}': {}", display, e), Some(e)))?;

    Ok(Rewrite {
        file_text,
        call_marker_seen: located.call_marker_seen,
    })
}
