//! Curriculum vitae built from the website's own content.
//!
//! [`source`] reads the site into [`source::SiteContent`], [`build`] turns that into a
//! [`CvRecord`], and [`latex`] and [`html`] render the record. Building and rendering are pure;
//! the only writes happen in [`write_outputs`] and [`source::persist_missing_defaults`].

use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    authors::{Mode, format_authors},
    text::{escape_html, escape_latex},
};

pub mod html;
pub mod latex;
pub mod source;

use source::{SiteContent, SourcePublication, text, write_creating_dirs};

pub const INTEGRATED_FILE: &str = "_data/cv_integrated.yml";
pub const LATEX_FILE: &str = "assets/files/cv.tex";
pub const HTML_FILE: &str = "cv/index.html";

const DEFAULT_RESEARCH_FOCUS: &str = "Machine Learning and Computational Biology";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvRecord {
    pub name: String,
    pub contact: Contact,
    pub research: Research,
    pub education: Vec<Education>,
    pub publications: Vec<CvPublication>,
    pub honors: Vec<Honor>,
    pub service: Vec<ServiceGroup>,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email_display: String,
    pub email_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Research {
    pub items: Vec<ResearchItem>,
    /// The items as one LaTeX paragraph.
    pub latex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchItem {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "text")]
    pub institution: String,
    #[serde(default, deserialize_with = "text")]
    pub location: String,
    #[serde(default, deserialize_with = "text")]
    pub degree: String,
    #[serde(default, deserialize_with = "text")]
    pub dates: String,
    #[serde(default)]
    pub details: Vec<Detail>,
}

/// A `label: value` line under an education entry. A bare string in the source becomes a label
/// with no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DetailRepr")]
pub struct Detail {
    pub label: String,
    pub value: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetailRepr {
    Pair {
        #[serde(default, deserialize_with = "text")]
        label: String,
        #[serde(default, deserialize_with = "text")]
        value: String,
    },
    Bare(#[serde(deserialize_with = "text")] String),
}

impl From<DetailRepr> for Detail {
    fn from(repr: DetailRepr) -> Self {
        match repr {
            DetailRepr::Pair { label, value } => Detail {
                label: label.trim().to_string(),
                value: value.trim().to_string(),
            },
            DetailRepr::Bare(label) => Detail {
                label,
                value: String::new(),
            },
        }
    }
}

impl Detail {
    /// `label: value`, or just the label when there is no value.
    pub fn line(&self) -> String {
        if self.value.is_empty() {
            self.label.clone()
        } else {
            format!("{}: {}", self.label, self.value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvPublication {
    pub title: String,
    pub title_latex: String,
    pub title_html: String,
    pub authors_latex: String,
    pub authors_html: String,
    pub venue_latex: String,
    pub venue_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Honor {
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub institution: String,
    #[serde(default, deserialize_with = "text")]
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    #[serde(default, deserialize_with = "text")]
    pub heading: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Where a publication goes on the CV. The variant order is the order of the sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Conference,
    Workshop,
    Preprint,
}

impl Category {
    /// Workshops are recognised first, then preprints; everything else counts as a conference
    /// paper.
    pub fn of(publication: &SourcePublication) -> Self {
        let lower = |s: &Option<String>| s.as_deref().unwrap_or("").to_lowercase();
        let venue = lower(&publication.conference);
        let short = lower(&publication.conference_short);
        let notes = lower(&publication.notes);

        if venue.contains("workshop") || short.contains("workshop") {
            Category::Workshop
        } else if venue.contains("arxiv") || venue.contains("biorxiv") || notes.contains("preprint")
        {
            Category::Preprint
        } else {
            Category::Conference
        }
    }
}

/// Knobs for [`build`] that do not come from the site itself.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Author to emphasise in publication lists; the site title when unset.
    pub highlight: Option<String>,
    pub last_updated: String,
}

fn render_publication(publication: &SourcePublication, highlight: &str) -> CvPublication {
    let title = publication.title.clone().unwrap_or_else(|| "Untitled".to_string());
    let venue = publication.conference.as_deref().unwrap_or("");
    CvPublication {
        title_latex: escape_latex(&title),
        title_html: escape_html(&title).into_owned(),
        authors_latex: format_authors(&publication.authors, highlight, Mode::Latex),
        authors_html: format_authors(&publication.authors, highlight, Mode::Html),
        venue_latex: escape_latex(venue),
        venue_html: escape_html(venue).into_owned(),
        title,
    }
}

/// Assemble the CV record.
pub fn build(site: &SiteContent, options: &BuildOptions) -> CvRecord {
    let highlight = options.highlight.as_deref().unwrap_or(&site.config.title);

    let (items, latex) = if site.research.is_empty() {
        (
            vec![ResearchItem {
                title: "Focus".to_string(),
                description: DEFAULT_RESEARCH_FOCUS.to_string(),
            }],
            escape_latex(DEFAULT_RESEARCH_FOCUS),
        )
    } else {
        let latex = site
            .research
            .iter()
            .map(|item| {
                format!(
                    "\\textbf{{{}}}: {}",
                    escape_latex(&item.title),
                    escape_latex(&item.description)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        (site.research.clone(), latex)
    };

    let mut ordered: Vec<&SourcePublication> = site.publications.iter().collect();
    // Stable, so source order holds within a category.
    ordered.sort_by_key(|p| Category::of(p));

    let email = site.config.email_address();
    CvRecord {
        name: site.config.title.clone(),
        contact: Contact {
            email_display: email.clone(),
            email_link: email,
            homepage: site.config.url.clone(),
            github: site.config.github_link.clone(),
        },
        research: Research { items, latex },
        education: site.education.clone(),
        publications: ordered
            .into_iter()
            .map(|p| render_publication(p, highlight))
            .collect(),
        honors: site.honors.clone(),
        service: site.service.clone(),
        last_updated: options.last_updated.clone(),
    }
}

/// Which outputs to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outputs {
    pub integrated: bool,
    pub latex: bool,
    pub html: bool,
}

impl Outputs {
    pub const ALL: Outputs = Outputs {
        integrated: true,
        latex: true,
        html: true,
    };
}

/// Write the requested renderings of `cv` under `root`. Returns the files written.
pub fn write_outputs(root: &Path, cv: &CvRecord, outputs: Outputs) -> anyhow::Result<Vec<String>> {
    let mut written = Vec::new();
    if outputs.integrated {
        write_creating_dirs(&root.join(INTEGRATED_FILE), &serde_yaml::to_string(cv)?)?;
        written.push(INTEGRATED_FILE.to_string());
    }
    if outputs.latex {
        write_creating_dirs(&root.join(LATEX_FILE), &latex::render(cv))?;
        written.push(LATEX_FILE.to_string());
    }
    if outputs.html {
        write_creating_dirs(&root.join(HTML_FILE), &html::render(cv))?;
        written.push(HTML_FILE.to_string());
    }
    for file in &written {
        info!(file = file.as_str(), "wrote CV output");
    }
    Ok(written)
}

/// Read back a record previously written to the integrated data file.
pub fn load_integrated(root: &Path) -> anyhow::Result<CvRecord> {
    let path = root.join(INTEGRATED_FILE);
    let raw = fs::read_to_string(&path).with_context(|| {
        format!(
            "failed to read {} (run the data stage first)",
            path.display()
        )
    })?;
    serde_yaml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
