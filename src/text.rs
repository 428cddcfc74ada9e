use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Decode HTML character references. Numeric references and the common named entities are
/// understood; anything else is left as written.
pub fn unescape_html(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    match quick_xml::escape::unescape_with(s, resolve_entity) {
        Ok(out) => out,
        // One unknown entity poisons the whole string for quick-xml, so fall back to a
        // piecewise pass that keeps the unknown reference verbatim.
        Err(_) => Cow::Owned(unescape_lossy(s)),
    }
}

fn resolve_entity(entity: &str) -> Option<&'static str> {
    let out = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "rsquo" => "\u{2019}",
        "lsquo" => "\u{2018}",
        "rdquo" => "\u{201d}",
        "ldquo" => "\u{201c}",
        "middot" => "\u{b7}",
        _ => return None,
    };
    Some(out)
}

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#?[A-Za-z0-9]+;").unwrap());

fn unescape_lossy(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let raw = &caps[0];
            match quick_xml::escape::unescape_with(raw, resolve_entity) {
                Ok(out) => out.into_owned(),
                Err(_) => raw.to_string(),
            }
        })
        .into_owned()
}

/// Escape text for inclusion in HTML element content or a quoted attribute.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Remove every `<...>` tag from `s`, leaving the text between them.
pub fn strip_tags(s: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(s, "")
}

/// Strip tags, decode entities and trim.
pub fn html_to_text(s: &str) -> String {
    unescape_html(&strip_tags(s)).trim().to_string()
}

/// Escape LaTeX special characters. HTML entities in the input are decoded first, so site
/// content written for the web (`&amp;`, `&#58;`) comes out as the literal character.
pub fn escape_latex(s: &str) -> String {
    let decoded = unescape_html(s);
    let mut out = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        match c {
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            c => out.push(c),
        }
    }
    out
}
