use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use super::{Identity, Outcome, Profile, Record, metric, timestamp};

pub const CACHED_MESSAGE: &str =
    "Using cached data - Google Scholar was unavailable during last update";
pub const PLACEHOLDER_MESSAGE: &str =
    "Google Scholar data will be populated once publications are indexed";

/// Read a previously written profile, if there is a usable one. Any JSON object will do; its
/// fields are not checked.
pub fn load_cached(path: &Path) -> Option<Record> {
    if !path.exists() {
        return None;
    }
    let parsed = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|raw| Ok(serde_json::from_str::<Record>(&raw)?));
    match parsed {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(path = %path.display(), "ignoring unreadable cached profile: {e}");
            None
        }
    }
}

/// The profile to write when Scholar could not be reached: the cached copy with a fresh
/// timestamp and a note, or an all-zero record if there is nothing cached.
pub fn fallback(
    cached: &Path,
    identity: &Identity,
    now: DateTime<Utc>,
) -> serde_json::Result<(Record, Outcome)> {
    match load_cached(cached) {
        Some(mut record) => {
            info!(
                path = %cached.display(),
                citations = %metric(&record, "citedby"),
                "using cached profile"
            );
            record.insert("updated".to_string(), Value::from(timestamp(now)));
            record.insert("message".to_string(), Value::from(CACHED_MESSAGE));
            Ok((record, Outcome::Cached))
        }
        None => {
            warn!("no cached profile, writing a placeholder");
            let mut profile = Profile::empty(identity, timestamp(now));
            profile.message = Some(PLACEHOLDER_MESSAGE.to_string());
            Ok((profile.to_record()?, Outcome::Placeholder))
        }
    }
}
