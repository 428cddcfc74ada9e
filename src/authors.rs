use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{escape_html, escape_latex, strip_tags, unescape_html};

/// Surname particles that stay attached to the family name when abbreviating.
const PARTICLES: &[&str] = &[
    "de", "del", "der", "van", "von", "da", "di", "la", "le", "du", "den", "ter", "ten", "dos",
    "das", "bin", "al", "ibn",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Unescaped and unmarked, for checking the splitting rules on their own.
    #[cfg(test)]
    Plain,
    Latex,
    Html,
}

/// One author after splitting, with the equal-contribution stars peeled off.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Author<'a> {
    name: &'a str,
    stars: usize,
}

enum Entry<'a> {
    Author(Author<'a>),
    EtAl,
}

static SUP_STAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<sup>\s*\*\s*</sup>").unwrap());
static COMMA_AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*and\s+").unwrap());
static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+and\s+").unwrap());

/// Normalise an author string into a comma separated list: entities decoded, markup removed,
/// `and` joins turned into commas.
fn normalise(authors: &str) -> String {
    let s = unescape_html(authors);
    let s = SUP_STAR_RE.replace_all(&s, "*");
    let s = strip_tags(&s);
    let s = COMMA_AND_RE.replace_all(&s, ", ");
    AND_RE.replace_all(&s, ", ").into_owned()
}

fn split_authors(normalised: &str) -> Vec<Author<'_>> {
    normalised
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            let name = part.trim_end_matches(|c: char| c == '*' || c.is_whitespace());
            let stars = part[name.len()..].matches('*').count();
            let name = name.trim();
            (!name.is_empty()).then_some(Author { name, stars })
        })
        .collect()
}

/// Index of the last author to keep. When `highlight` is listed this is the later of its first
/// position and the rightmost starred author; otherwise everyone is kept.
fn cutoff(authors: &[Author<'_>], highlight: &str) -> Option<usize> {
    let last = authors.len().checked_sub(1)?;
    let Some(mine) = authors.iter().position(|a| a.name == highlight) else {
        return Some(last);
    };
    let starred = authors.iter().rposition(|a| a.stars > 0);
    Some(starred.map_or(mine, |s| s.max(mine)).min(last))
}

/// Format an author list for a CV: names abbreviated, `highlight` emphasised, and the tail cut
/// to "et al." after the highlighted author (or the last equal-contribution author, whichever
/// comes later).
pub fn format_authors(authors: &str, highlight: &str, mode: Mode) -> String {
    let normalised = normalise(authors);
    let parsed = split_authors(&normalised);
    let Some(keep) = cutoff(&parsed, highlight) else {
        return String::new();
    };

    let truncated = keep + 1 < parsed.len();
    let entries = parsed
        .into_iter()
        .take(keep + 1)
        .map(Entry::Author)
        .chain(truncated.then_some(Entry::EtAl));

    entries
        .map(|entry| match entry {
            Entry::EtAl => escape(mode, "et al."),
            Entry::Author(author) => render_author(&author, highlight, mode),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape(mode: Mode, s: &str) -> String {
    match mode {
        #[cfg(test)]
        Mode::Plain => s.to_string(),
        Mode::Latex => escape_latex(s),
        Mode::Html => escape_html(s).into_owned(),
    }
}

fn render_author(author: &Author<'_>, highlight: &str, mode: Mode) -> String {
    let short = escape(mode, &abbreviate_name(author.name));
    let marker = escape(mode, &"*".repeat(author.stars));
    if author.name != highlight {
        return short + &marker;
    }
    match mode {
        #[cfg(test)]
        Mode::Plain => short + &marker,
        Mode::Latex => format!("\\underline{{\\textbf{{{short}}}}}{marker}"),
        Mode::Html => format!("<span class=\"cv-me\">{short}</span>{marker}"),
    }
}

/// Reduce given names to initials, keeping the surname (and any particles before it) intact.
///
/// `Jean-Paul van der Berg` becomes `J.-P. van der Berg`.
pub fn abbreviate_name(full_name: &str) -> String {
    let words: Vec<&str> = full_name.split_whitespace().collect();
    let Some((_, given_and_particles)) = words.split_last() else {
        return full_name.trim().to_string();
    };

    let surname_start = given_and_particles
        .iter()
        .rposition(|w| !is_particle(w))
        .map_or(0, |i| i + 1);
    let (given, surname) = words.split_at(surname_start);

    given
        .iter()
        .map(|w| initials(w))
        .filter(|w| !w.is_empty())
        .chain(std::iter::once(surname.join(" ")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_particle(word: &str) -> bool {
    PARTICLES.iter().any(|p| p.eq_ignore_ascii_case(word))
}

fn initials(word: &str) -> String {
    word.split('-')
        .filter_map(|seg| seg.chars().next())
        .map(|c| format!("{}.", c.to_uppercase()))
        .collect::<Vec<_>>()
        .join("-")
}
