//! Profiles assembled from a hand-maintained publication list, for when scraping is not an option.

use std::{fs, path::Path};

use anyhow::Context;
use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use super::{Bib, Identity, Profile, PubYear, Publication, Publications, timestamp};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualList {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub publications: Vec<ManualPublication>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManualPublication {
    pub title: String,
    pub authors: String,
    pub venue: String,
    pub year: Option<i64>,
    pub citations: u64,
    pub url: Option<String>,
}

impl ManualList {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read publication list {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse publication list {}", path.display()))
    }
}

/// Largest `h` such that `h` papers have at least `h` citations each.
pub fn h_index(citations: &[u64]) -> u64 {
    let mut sorted = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .enumerate()
        .take_while(|&(i, &c)| c > i as u64)
        .count() as u64
}

/// Build a profile from the list. Both metric columns get the same all-time values.
pub fn build(list: &ManualList, now: DateTime<Utc>) -> Profile {
    let counts: Vec<u64> = list.publications.iter().map(|p| p.citations).collect();
    let total = counts.iter().sum();
    let hindex = h_index(&counts);
    let i10 = counts.iter().filter(|&&c| c >= 10).count() as u64;

    let publications = list.publications.iter().map(|p| Publication {
        bib: Bib {
            title: p.title.clone(),
            author: p.authors.clone(),
            venue: p.venue.clone(),
            pub_year: PubYear::Number(p.year.unwrap_or_else(|| i64::from(now.year()))),
            extra: Default::default(),
        },
        num_citations: p.citations,
        pub_url: p.url.clone().unwrap_or_else(|| "#".to_string()),
        author_pub_id: String::new(),
        extra: Default::default(),
    });

    Profile {
        citedby: total,
        citedby5y: total,
        hindex,
        hindex5y: hindex,
        i10index: i10,
        i10index5y: i10,
        publications: Publications::positional(publications),
        ..Profile::empty(&list.identity, timestamp(now))
    }
}
