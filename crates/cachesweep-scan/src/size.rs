//! Subtree size measurement for matched folders.

use std::path::Path;

use jwalk::{Parallelism, WalkDir};
use tokio_util::sync::CancellationToken;

/// Total size in bytes of every regular file beneath `path`.
///
/// Hidden entries are included and symbolic links are neither followed nor
/// counted. Entries that cannot be read contribute zero. The token is
/// polled before each entry; once it fires, the partial sum is returned.
pub fn directory_size(path: &Path, cancel: &CancellationToken) -> u64 {
    let walker = WalkDir::new(path)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false);

    let mut total: u64 = 0;

    for entry_result in walker {
        if cancel.is_cancelled() {
            break;
        }

        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                tracing::trace!(path = %path.display(), error = %err, "size walk skipped entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Ok(metadata) = entry.metadata() {
            total = total.saturating_add(metadata.len());
        }
    }

    total
}
