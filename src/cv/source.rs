//! Reading the site's own content: `_config.yml`, the publication list, the optional
//! education/honors/service lists, and the research blurb on the landing page.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use super::{Detail, Education, Honor, ResearchItem, ServiceGroup};
use crate::text::unescape_html;

pub const CONFIG_FILE: &str = "_config.yml";
pub const PUBLICATIONS_FILE: &str = "_data/publications.yml";
pub const EDUCATION_FILE: &str = "_data/education.yml";
pub const HONORS_FILE: &str = "_data/honors.yml";
pub const SERVICE_FILE: &str = "_data/service.yml";
pub const INDEX_FILE: &str = "index.md";

pub const DEFAULT_RESEARCH_ANCHOR: &str = "I work on the intersection";

/// Accept any YAML scalar where text is expected; `year: 2024` reads as `"2024"`.
pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    use serde::de::Error;
    match serde_yaml::Value::deserialize(d)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected text, found {other:?}"))),
    }
}

fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let s = text(d)?;
    Ok((!s.trim().is_empty()).then_some(s))
}

/// The parts of the Jekyll site configuration the CV needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    #[serde(deserialize_with = "text")]
    pub title: String,
    #[serde(deserialize_with = "text")]
    pub email: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub github_link: Option<String>,
}

impl SiteConfig {
    /// The email with the anti-scraping ` (at) ` spelled back out.
    pub fn email_address(&self) -> String {
        self.email.replace(" (at) ", "@")
    }
}

/// A publication as listed in `_data/publications.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourcePublication {
    #[serde(default, deserialize_with = "opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub authors: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub conference: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub conference_short: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PublicationsFile {
    #[serde(default)]
    main: Vec<SourcePublication>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationFile {
    #[serde(default)]
    pub items: Vec<Education>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HonorsFile {
    #[serde(default)]
    pub items: Vec<Honor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFile {
    #[serde(default)]
    pub groups: Vec<ServiceGroup>,
}

/// Optional list files: what they are called and what goes in them when they do not exist.
pub trait OptionalList: Serialize + DeserializeOwned {
    const PATH: &'static str;
    fn placeholder() -> Self;
    fn empty() -> Self;
}

impl OptionalList for EducationFile {
    const PATH: &'static str = EDUCATION_FILE;

    fn placeholder() -> Self {
        EducationFile {
            items: vec![Education {
                institution: "University Name".into(),
                location: "City, Country".into(),
                degree: "Ph.D. in Your Field".into(),
                dates: "Sep. 2020 -- Present".into(),
                details: vec![
                    Detail {
                        label: "Advisor".into(),
                        value: "Advisor Name".into(),
                    },
                    Detail {
                        label: "Research Focus".into(),
                        value: "Your Research Area".into(),
                    },
                ],
            }],
        }
    }

    fn empty() -> Self {
        EducationFile { items: Vec::new() }
    }
}

impl OptionalList for HonorsFile {
    const PATH: &'static str = HONORS_FILE;

    fn placeholder() -> Self {
        HonorsFile {
            items: vec![Honor {
                name: "Award Name".into(),
                institution: "Awarding Institution".into(),
                year: "2024".into(),
            }],
        }
    }

    fn empty() -> Self {
        HonorsFile { items: Vec::new() }
    }
}

impl OptionalList for ServiceFile {
    const PATH: &'static str = SERVICE_FILE;

    fn placeholder() -> Self {
        ServiceFile {
            groups: vec![ServiceGroup {
                heading: "Conference Reviewer".into(),
                items: vec!["Conference Name (ABBR)".into()],
            }],
        }
    }

    fn empty() -> Self {
        ServiceFile { groups: Vec::new() }
    }
}

/// Read an optional list. Never fails: a missing or malformed file yields the placeholder, an
/// empty one yields an empty list.
pub fn load_or_default<T: OptionalList>(root: &Path) -> T {
    let path = root.join(T::PATH);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), "optional file not read ({e}), using placeholder");
            return T::placeholder();
        }
    };
    if raw.trim().is_empty() {
        return T::empty();
    }
    match serde_yaml::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), "malformed optional file, using placeholder: {e}");
            T::placeholder()
        }
    }
}

/// Write the placeholder for each optional list that does not exist yet. Returns the files
/// created.
pub fn persist_missing_defaults(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (path, yaml) in [
        (EDUCATION_FILE, serde_yaml::to_string(&EducationFile::placeholder())?),
        (HONORS_FILE, serde_yaml::to_string(&HonorsFile::placeholder())?),
        (SERVICE_FILE, serde_yaml::to_string(&ServiceFile::placeholder())?),
    ] {
        let path = root.join(path);
        if path.exists() {
            continue;
        }
        write_creating_dirs(&path, &yaml)?;
        info!(path = %path.display(), "created placeholder");
        written.push(path);
    }
    Ok(written)
}

pub(crate) fn write_creating_dirs(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn read_required(root: &Path, rel: &str) -> anyhow::Result<String> {
    let path = root.join(rel);
    fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
}

fn parse_required<T: DeserializeOwned>(root: &Path, rel: &str) -> anyhow::Result<T> {
    let raw = read_required(root, rel)?;
    serde_yaml::from_str(&raw).with_context(|| format!("failed to parse {}", root.join(rel).display()))
}

/// Pull `- **<span ...>Title:</span>** description` bullets out of the section of `markdown`
/// that starts at `anchor` and runs to the next `##` heading.
pub fn extract_research(markdown: &str, anchor: &str) -> Vec<ResearchItem> {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static BULLET_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"- \*\*<span.*?>(.*?)</span>\*\* (.*)").unwrap());

    let Some(start) = markdown.find(anchor) else {
        return Vec::new();
    };
    let rest = &markdown[start..];
    let Some(end) = rest.find("##") else {
        return Vec::new();
    };

    BULLET_RE
        .captures_iter(&rest[..end])
        .map(|c| ResearchItem {
            title: unescape_html(c[1].trim().trim_end_matches(':')).into_owned(),
            description: unescape_html(c[2].trim()).into_owned(),
        })
        .collect()
}

/// Everything the CV is built from, read from a site checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteContent {
    pub config: SiteConfig,
    pub publications: Vec<SourcePublication>,
    pub research: Vec<ResearchItem>,
    pub education: Vec<Education>,
    pub honors: Vec<Honor>,
    pub service: Vec<ServiceGroup>,
}

impl SiteContent {
    /// Read the site at `root`. The configuration, the publication list and the landing page
    /// are required; the other lists fall back to placeholders.
    pub fn load(root: &Path, research_anchor: &str) -> anyhow::Result<Self> {
        let config: SiteConfig = parse_required(root, CONFIG_FILE)?;
        let publications: PublicationsFile = parse_required(root, PUBLICATIONS_FILE)?;
        let index = read_required(root, INDEX_FILE)?;

        let research = extract_research(&index, research_anchor);
        if research.is_empty() {
            warn!(anchor = research_anchor, "no research bullets found in {INDEX_FILE}");
        }

        Ok(SiteContent {
            config,
            publications: publications.main,
            research,
            education: load_or_default::<EducationFile>(root).items,
            honors: load_or_default::<HonorsFile>(root).items,
            service: load_or_default::<ServiceFile>(root).groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
# About me

I work on the intersection of machine learning and biology:

- **<span style="color: #00356B">Foundation Models:</span>** Large models for cells &amp; genes.
- **<span style="color: #00356B">Geometry:</span>** Symmetry-aware networks.

## News
- **<span>Ignored:</span>** not part of the section
"#;

    #[test]
    fn research_bullets_are_extracted() {
        let items = extract_research(INDEX, DEFAULT_RESEARCH_ANCHOR);
        assert_eq!(
            items,
            vec![
                ResearchItem {
                    title: "Foundation Models".into(),
                    description: "Large models for cells & genes.".into(),
                },
                ResearchItem {
                    title: "Geometry".into(),
                    description: "Symmetry-aware networks.".into(),
                },
            ]
        );
    }

    #[test]
    fn research_needs_anchor_and_heading() {
        assert!(extract_research(INDEX, "not present").is_empty());
        assert!(extract_research("I work on the intersection\n- **<span>A</span>** b", DEFAULT_RESEARCH_ANCHOR).is_empty());
    }

    #[test]
    fn config_requires_title_and_email() {
        let err = serde_yaml::from_str::<SiteConfig>("email: a (at) b.org\n").unwrap_err();
        assert!(err.to_string().contains("title"), "{err}");

        let cfg: SiteConfig =
            serde_yaml::from_str("title: Ada\nemail: ada (at) example.org\nurl: ''\nother: 1\n")
                .unwrap();
        assert_eq!(cfg.email_address(), "ada@example.org");
        assert_eq!(cfg.url, None);
        assert_eq!(cfg.github_link, None);
    }

    #[test]
    fn scalar_fields_and_bare_details_are_accepted() {
        let honors: HonorsFile =
            serde_yaml::from_str("items:\n  - name: Prize\n    institution: Uni\n    year: 2023\n")
                .unwrap();
        assert_eq!(honors.items[0].year, "2023");

        let edu: EducationFile = serde_yaml::from_str(
            "items:\n  - institution: Uni\n    details:\n      - label: ' Advisor '\n        value: Someone\n      - Dean's list\n",
        )
        .unwrap();
        assert_eq!(
            edu.items[0].details,
            vec![
                Detail { label: "Advisor".into(), value: "Someone".into() },
                Detail { label: "Dean's list".into(), value: String::new() },
            ]
        );
        assert_eq!(edu.items[0].degree, "");
    }

    #[test]
    fn optional_files_default_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let edu: EducationFile = load_or_default(dir.path());
        assert_eq!(edu, EducationFile::placeholder());
        assert!(!dir.path().join(EDUCATION_FILE).exists());

        fs::create_dir_all(dir.path().join("_data")).unwrap();
        fs::write(dir.path().join(HONORS_FILE), "items: [unclosed").unwrap();
        assert_eq!(load_or_default::<HonorsFile>(dir.path()), HonorsFile::placeholder());

        fs::write(dir.path().join(SERVICE_FILE), "\n").unwrap();
        assert!(load_or_default::<ServiceFile>(dir.path()).groups.is_empty());
    }

    #[test]
    fn persisting_defaults_skips_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("_data")).unwrap();
        fs::write(dir.path().join(HONORS_FILE), "items: []\n").unwrap();

        let written = persist_missing_defaults(dir.path()).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join(EDUCATION_FILE), dir.path().join(SERVICE_FILE)]
        );
        assert_eq!(fs::read_to_string(dir.path().join(HONORS_FILE)).unwrap(), "items: []\n");
        assert_eq!(load_or_default::<EducationFile>(dir.path()), EducationFile::placeholder());
    }
}
