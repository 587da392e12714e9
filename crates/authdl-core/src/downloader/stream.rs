//! Reading a response body while reporting progress.

use crate::error::TransportError;
use crate::http::BodyChunks;
use crate::progress::ProgressTracker;
use crate::ui::UiEvents;

/// Cap on the up-front allocation taken from `Content-Length`.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Drains `body` into one buffer, reporting progress under `label`.
///
/// Progress is only pushed to the UI when it changes. On a read error the
/// partial payload is dropped with the error.
pub(crate) fn collect_body(
    body: BodyChunks,
    total: Option<u64>,
    label: &str,
    ui: &dyn UiEvents,
) -> Result<Vec<u8>, TransportError> {
    let mut tracker = ProgressTracker::new(total);
    let capacity = tracker.total().map(|t| t.min(MAX_PREALLOC) as usize).unwrap_or(0);
    let mut payload = Vec::with_capacity(capacity);
    let mut last = None;

    for chunk in body {
        let chunk = chunk?;
        payload.extend_from_slice(&chunk);
        tracker.advance(chunk.len());
        let snapshot = tracker.snapshot(label);
        if last.as_ref() != Some(&snapshot) {
            ui.update_progress(snapshot.clone());
            last = Some(snapshot);
        }
    }
    Ok(payload)
}
