//! ETag computation for single persons and for pages of persons.
//!
//! A person's ETag depends only on its `modified_at`. A page's ETag depends on
//! the window, the table's row count and the table-wide maximum
//! `modified_at`, so any write anywhere invalidates every page. Contact rows
//! are not consulted: a rename of B leaves A's tag unchanged even though A's
//! resolved contact list changes.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::person::PageWindow;

/// ETag for one person.
pub fn person_etag(modified_at: DateTime<Utc>) -> String {
  let mut hasher = Sha256::new();
  hasher.update(b"person");
  hasher.update(modified_at.timestamp_micros().to_le_bytes());
  quote(hasher)
}

/// ETag for one page of the person listing.
pub fn page_etag(
  window: PageWindow,
  total: u64,
  max_modified_at: Option<DateTime<Utc>>,
) -> String {
  let mut hasher = Sha256::new();
  hasher.update(b"page");
  hasher.update(window.limit.to_le_bytes());
  hasher.update(window.offset.to_le_bytes());
  hasher.update(total.to_le_bytes());
  match max_modified_at {
    Some(ts) => {
      hasher.update([1u8]);
      hasher.update(ts.timestamp_micros().to_le_bytes());
    }
    None => hasher.update([0u8]),
  }
  quote(hasher)
}

fn quote(hasher: Sha256) -> String {
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether an `If-None-Match` style value matches `current`.
///
/// Accepts quoted or bare tags, weak (`W/`) tags, comma-separated lists and
/// `*`.
pub fn etag_matches(presented: &str, current: &str) -> bool {
  let current = strip_etag(current);
  presented.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || strip_etag(candidate) == current
  })
}

/// Strip the weak prefix and surrounding double-quotes from an ETag value.
fn strip_etag(s: &str) -> &str {
  s.strip_prefix("W/").unwrap_or(s).trim_matches('"')
}
