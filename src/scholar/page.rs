use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::text::{html_to_text, unescape_html};

use super::{Bib, FetchError, PubYear, Publication};

/// What a Scholar profile page tells us.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePage {
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub stats: Option<Stats>,
    pub rows: Vec<Row>,
}

/// The "Cited by" table: an all-time column and a since-year column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub citedby: u64,
    pub citedby5y: u64,
    pub hindex: u64,
    pub hindex5y: u64,
    pub i10index: u64,
    pub i10index5y: u64,
}

/// One line of the publication table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub title: String,
    pub authors: String,
    pub venue: String,
    pub year: String,
    pub citations: u64,
    pub href: Option<String>,
}

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<div\b[^>]*\bid="gsc_prf_in"[^>]*>(.*?)</div>"#).unwrap());
static AFFILIATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<div\b[^>]*\bclass="gsc_prf_il"[^>]*>(.*?)</div>"#).unwrap());
static STATS_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<table\b[^>]*\bid="gsc_rsb_st"[^>]*>(.*?)</table>"#).unwrap());
static STATS_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<td\b[^>]*\bclass="gsc_rsb_std"[^>]*>(.*?)</td>"#).unwrap());
static ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<tr\b[^>]*\bclass="gsc_a_tr"[^>]*>(.*?)</tr>"#).unwrap());
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b([^>]*\bclass="gsc_a_at"[^>]*)>(.*?)</a>"#).unwrap()
});
static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static GRAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<div\b[^>]*\bclass="gs_gray"[^>]*>(.*?)</div>"#).unwrap());
// Scholar repeats the year after the venue in a span hidden on wide screens.
static VENUE_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<span\b[^>]*\bclass="gs_oph"[^>]*>.*?</span>"#).unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<span\b[^>]*\bclass="gsc_a_h\b[^"]*"[^>]*>(.*?)</span>"#).unwrap()
});
static CITES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*\bclass="gsc_a_ac\b[^"]*"[^>]*>(.*?)</a>"#).unwrap()
});

/// Parse a `citations?user=...` page. Anything missing is left empty; deciding whether that
/// is fatal is up to the caller.
pub fn parse(html: &str) -> ProfilePage {
    ProfilePage {
        name: first_text(&NAME_RE, html),
        affiliation: first_text(&AFFILIATION_RE, html),
        stats: parse_stats(html),
        rows: ROW_RE
            .captures_iter(html)
            .map(|c| parse_row(&c[1]))
            .collect(),
    }
}

fn first_text(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .map(|c| html_to_text(&c[1]))
        .filter(|s| !s.is_empty())
}

fn parse_count(s: &str) -> Option<u64> {
    let digits: String = html_to_text(s).chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

fn parse_stats(html: &str) -> Option<Stats> {
    let table = STATS_TABLE_RE.captures(html)?;
    let cells: Vec<u64> = STATS_CELL_RE
        .captures_iter(&table[1])
        .map(|c| parse_count(&c[1]))
        .collect::<Option<_>>()?;
    let [citedby, citedby5y, hindex, hindex5y, i10index, i10index5y] = cells[..] else {
        return None;
    };
    Some(Stats {
        citedby,
        citedby5y,
        hindex,
        hindex5y,
        i10index,
        i10index5y,
    })
}

fn parse_row(row: &str) -> Row {
    let (title, href) = TITLE_RE
        .captures(row)
        .map(|c| {
            let href = HREF_RE
                .captures(&c[1])
                .and_then(|h| h.get(1).or_else(|| h.get(2)))
                .map(|m| unescape_html(m.as_str()).into_owned());
            (html_to_text(&c[2]), href)
        })
        .unwrap_or_default();

    let mut gray = GRAY_RE.captures_iter(row).map(|c| c.get(1).map_or("", |m| m.as_str()));
    let authors = gray.next().map(html_to_text).unwrap_or_default();
    let venue = gray
        .next()
        .map(|v| html_to_text(&VENUE_YEAR_RE.replace_all(v, "")))
        .unwrap_or_default();

    Row {
        title,
        authors,
        venue,
        year: first_text(&YEAR_RE, row).unwrap_or_default(),
        citations: CITES_RE
            .captures(row)
            .and_then(|c| parse_count(&c[1]))
            .unwrap_or(0),
        href,
    }
}

impl ProfilePage {
    /// The stats table is the one thing every real profile page has; a block page or CAPTCHA
    /// does not.
    pub fn require_stats(&self) -> Result<Stats, FetchError> {
        self.stats.ok_or_else(|| {
            FetchError::Parse("no citation table on the page (blocked or unknown user?)".into())
        })
    }
}

impl Row {
    pub fn into_publication(self, base: &Url) -> Publication {
        let pub_url = self
            .href
            .as_deref()
            .and_then(|h| base.join(h).ok())
            .map_or_else(|| "#".to_string(), String::from);
        Publication {
            bib: Bib {
                title: self.title,
                author: self.authors,
                venue: self.venue,
                pub_year: PubYear::Text(self.year),
                extra: Default::default(),
            },
            num_citations: self.citations,
            pub_url,
            author_pub_id: String::new(),
            extra: Default::default(),
        }
    }
}
