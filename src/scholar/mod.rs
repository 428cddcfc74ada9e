//! Google Scholar citation metrics: the profile record written for the website, the shields.io
//! badge derived from it, and the fetch-then-fallback flow that produces both.

use std::{fmt, fs, path::Path};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use serde_json::{Map, Value};
use tracing::{info, warn};

pub mod fallback;
pub mod manual;
pub mod page;
pub mod strategy;

use strategy::{Client, Strategy};

pub const PROFILE_FILE: &str = "gs_data.json";
pub const BADGE_FILE: &str = "gs_data_shieldsio.json";

/// Errors from talking to Scholar. Every one of them is recoverable: the caller falls back to
/// the last persisted profile.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("bad profile URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected profile page: {0}")]
    Parse(String),
}

/// A profile as it goes to disk. A cached copy stays raw JSON, so rewriting it on fallback
/// changes nothing but `updated` and `message`.
pub type Record = Map<String, Value>;

/// Full citation profile of one author, as built from a fetch or a manual list. Fields this
/// crate does not know about are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub citedby: u64,
    #[serde(default)]
    pub citedby5y: u64,
    #[serde(default)]
    pub hindex: u64,
    #[serde(default)]
    pub hindex5y: u64,
    #[serde(default)]
    pub i10index: u64,
    #[serde(default)]
    pub i10index5y: u64,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub publications: Publications,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// A record with every metric at zero.
    pub fn empty(identity: &Identity, updated: String) -> Self {
        Profile {
            name: identity.name.clone(),
            affiliation: identity.affiliation.clone(),
            email: identity.email.clone(),
            citedby: 0,
            citedby5y: 0,
            hindex: 0,
            hindex5y: 0,
            i10index: 0,
            i10index5y: 0,
            updated,
            publications: Publications::default(),
            message: None,
            extra: Map::new(),
        }
    }

    pub fn to_record(&self) -> serde_json::Result<Record> {
        serde_json::from_value(serde_json::to_value(self)?)
    }

    /// Fill in whatever the source left blank from the configured identity. Scholar never shows
    /// the address itself, so the configured email always wins when set.
    pub fn with_identity(mut self, identity: &Identity) -> Self {
        if self.name.is_empty() {
            self.name = identity.name.clone();
        }
        if self.affiliation.is_empty() {
            self.affiliation = identity.affiliation.clone();
        }
        if !identity.email.is_empty() {
            self.email = identity.email.clone();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub bib: Bib,
    #[serde(default)]
    pub num_citations: u64,
    #[serde(default = "no_link")]
    pub pub_url: String,
    #[serde(default)]
    pub author_pub_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn no_link() -> String {
    "#".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bib {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub pub_year: PubYear,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Scraped pages give the year as text, hand-maintained lists as a number. Both are written back
/// the way they were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PubYear {
    Number(i64),
    Text(String),
}

impl Default for PubYear {
    fn default() -> Self {
        PubYear::Text(String::new())
    }
}

/// Publications keyed by id, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Publications(Vec<(String, Publication)>);

impl Publications {
    /// Assign positional ids (`pub_0`, `pub_1`, ...) in iteration order.
    pub fn positional(pubs: impl IntoIterator<Item = Publication>) -> Self {
        Publications(
            pubs.into_iter()
                .enumerate()
                .map(|(i, mut p)| {
                    let id = format!("pub_{i}");
                    p.author_pub_id = id.clone();
                    (id, p)
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Publication> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, p)| p)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Publication)> {
        self.0.iter().map(|(k, p)| (k.as_str(), p))
    }
}

impl Serialize for Publications {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, publication) in &self.0 {
            map.serialize_entry(id, publication)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Publications {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PublicationsVisitor;

        impl<'de> Visitor<'de> for PublicationsVisitor {
            type Value = Publications;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of publication id to publication")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, publication)) = access.next_entry::<String, Publication>()? {
                    entries.push((id, publication));
                }
                Ok(Publications(entries))
            }
        }

        deserializer.deserialize_map(PublicationsVisitor)
    }
}

/// shields.io endpoint badge descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
}

impl Badge {
    pub fn for_record(record: &Record) -> Self {
        Badge {
            schema_version: 1,
            label: "citations".to_string(),
            message: metric(record, "citedby"),
        }
    }
}

/// A top-level metric of `record` as display text. Cached files are not validated, so anything
/// that is not a number or a non-blank string reads as `0`.
pub fn metric(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "0".to_string(),
    }
}

/// Who the profile belongs to, used wherever Scholar does not say.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub affiliation: String,
    pub email: String,
}

impl Identity {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read identity file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse identity file {}", path.display()))
    }
}

/// ISO-8601 UTC timestamp, as stored in `updated`.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// How the written profile came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fetched(&'static str),
    Cached,
    Placeholder,
}

/// Try each strategy in order; if all fail, fall back to the copy already in `out_dir`.
///
/// The caller normally passes [`strategy::STRATEGIES`].
pub fn fetch_or_fallback(
    client: &Client,
    strategies: &[&(dyn Strategy + Sync)],
    out_dir: &Path,
    identity: &Identity,
    now: DateTime<Utc>,
) -> serde_json::Result<(Record, Outcome)> {
    for strategy in strategies {
        match strategy.fetch(client) {
            Ok(mut profile) => {
                profile.updated = timestamp(now);
                info!(
                    strategy = strategy.name(),
                    citations = profile.citedby,
                    hindex = profile.hindex,
                    i10index = profile.i10index,
                    publications = profile.publications.len(),
                    "fetched profile"
                );
                if profile.publications.is_empty() {
                    warn!(strategy = strategy.name(), "fetched profile lists no publications");
                }
                let profile = profile.with_identity(identity);
                return Ok((profile.to_record()?, Outcome::Fetched(strategy.name())));
            }
            Err(e) => warn!(strategy = strategy.name(), "fetch failed: {e}"),
        }
    }
    fallback::fallback(&out_dir.join(PROFILE_FILE), identity, now)
}

/// Write the profile and its badge into `out_dir`, creating it if needed.
pub fn write_outputs(out_dir: &Path, record: &Record) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let profile_path = out_dir.join(PROFILE_FILE);
    fs::write(&profile_path, serde_json::to_string_pretty(record)?)
        .with_context(|| format!("failed to write {}", profile_path.display()))?;

    let badge_path = out_dir.join(BADGE_FILE);
    fs::write(&badge_path, serde_json::to_string_pretty(&Badge::for_record(record))?)
        .with_context(|| format!("failed to write {}", badge_path.display()))?;

    info!(
        profile = %profile_path.display(),
        badge = %badge_path.display(),
        "wrote citation data"
    );
    Ok(())
}
