use super::CvRecord;
use crate::text::escape_html;

const FRONT_MATTER: &[&str] = &[
    "---",
    "layout: default",
    "title: Curriculum Vitae",
    "permalink: /cv/",
    "---",
];

const STYLE: &str = r#"<style>
.cv-page { max-width: 900px; margin: 0 auto; padding: 2rem 1.5rem 4rem; }
.cv-header h1 { color: var(--global-theme-color, #00356B); margin-bottom: 0.2rem; }
.cv-contact { font-size: 0.95rem; color: var(--text-color, #222); }
.cv-contact a { color: inherit; text-decoration: none; border-bottom: 1px solid var(--global-theme-color, #00356B); }
.cv-contact a:hover { color: var(--global-theme-color, #00356B); }
.cv-download { margin: 1.5rem 0 2rem; font-size: 0.95rem; }
.cv-download a { color: var(--global-theme-color, #00356B); font-weight: 600; text-decoration: none; }
.cv-download a:hover { text-decoration: underline; }
.cv-section { margin-bottom: 2rem; }
.cv-section-title { color: var(--global-theme-color, #00356B); font-size: 1.2rem; text-transform: uppercase; letter-spacing: 0.08em; margin-bottom: 0.75rem; font-weight: 700; }
.cv-research li { margin-bottom: 0.4rem; }
.cv-education-item { margin-bottom: 1.2rem; }
.cv-education-heading { display: flex; justify-content: space-between; font-weight: 600; }
.cv-education-sub { font-style: italic; display: flex; justify-content: space-between; font-size: 0.95rem; margin-top: 0.15rem; }
.cv-education-details { margin: 0.4rem 0 0.2rem 1rem; font-size: 0.95rem; }
.cv-education-details li { margin-bottom: 0.2rem; }
.cv-publication-list { list-style: none; padding-left: 0; }
.cv-publication-list li { margin-bottom: 1rem; }
.cv-pub-title { font-weight: 600; }
.cv-pub-authors { display: block; margin-top: 0.2rem; }
.cv-pub-venue { display: block; font-style: italic; margin-top: 0.15rem; }
.cv-me { font-weight: 700; text-decoration: underline; }
.cv-honor-list { list-style: none; padding-left: 0; }
.cv-honor-list li { display: flex; justify-content: space-between; margin-bottom: 0.35rem; font-size: 0.95rem; }
.cv-service-heading { font-weight: 600; margin-bottom: 0.3rem; }
.cv-service-list { list-style: disc; padding-left: 1.2rem; margin-top: 0.2rem; }
.cv-last-updated { margin-top: 3rem; font-size: 0.9rem; color: var(--text-color, #555); }
@media (max-width: 640px) { .cv-education-heading, .cv-education-sub { flex-direction: column; gap: 0.1rem; } .cv-honor-list li { flex-direction: column; align-items: flex-start; gap: 0.15rem; } }
</style>"#;

const PDF_LINK: &str = "{{ '/assets/files/cv.pdf' | relative_url }}";
const TEX_LINK: &str = "{{ '/assets/files/cv.tex' | relative_url }}";

fn link(href: &str, shown: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_html(href), escape_html(shown))
}

fn section_start(lines: &mut Vec<String>, title: &str) {
    lines.push("  <section class=\"cv-section\">".to_string());
    lines.push(format!("    <h2 class=\"cv-section-title\">{title}</h2>"));
}

/// Render the CV as a Jekyll page served at `/cv/`.
pub fn render(cv: &CvRecord) -> String {
    let mut lines: Vec<String> = FRONT_MATTER.iter().map(|l| l.to_string()).collect();
    lines.push(STYLE.to_string());

    lines.push("<div class=\"cv-page\">".to_string());
    lines.push("  <div class=\"cv-header\">".to_string());
    lines.push(format!("    <h1>{}</h1>", escape_html(&cv.name)));
    lines.push("    <div class=\"cv-contact\">".to_string());
    let contact = &cv.contact;
    let mut links = vec![link(
        &format!("mailto:{}", contact.email_link),
        &contact.email_display,
    )];
    links.extend(
        [&contact.homepage, &contact.github]
            .into_iter()
            .flatten()
            .map(|url| link(url, url)),
    );
    lines.push(format!("      {}", links.join(" · ")));
    lines.push("    </div>".to_string());
    lines.push("  </div>".to_string());
    lines.push(format!(
        "  <p class=\"cv-download\"><a href=\"{PDF_LINK}\">Download PDF</a> · <a href=\"{TEX_LINK}\">LaTeX Source</a></p>"
    ));

    section_start(&mut lines, "Research Interest");
    lines.push("    <ul class=\"cv-research\">".to_string());
    for item in &cv.research.items {
        lines.push(format!(
            "      <li><strong>{}:</strong> {}</li>",
            escape_html(&item.title),
            escape_html(&item.description)
        ));
    }
    lines.push("    </ul>".to_string());
    lines.push("  </section>".to_string());

    section_start(&mut lines, "Education");
    for edu in &cv.education {
        lines.push("    <div class=\"cv-education-item\">".to_string());
        lines.push(format!(
            "      <div class=\"cv-education-heading\"><span>{}</span><span>{}</span></div>",
            escape_html(&edu.institution),
            escape_html(&edu.location)
        ));
        lines.push(format!(
            "      <div class=\"cv-education-sub\"><span>{}</span><span>{}</span></div>",
            escape_html(&edu.degree),
            escape_html(&edu.dates)
        ));
        if !edu.details.is_empty() {
            lines.push("      <ul class=\"cv-education-details\">".to_string());
            for detail in &edu.details {
                if detail.value.is_empty() {
                    lines.push(format!("        <li>{}</li>", escape_html(&detail.label)));
                } else {
                    lines.push(format!(
                        "        <li><strong>{}:</strong> {}</li>",
                        escape_html(&detail.label),
                        escape_html(&detail.value)
                    ));
                }
            }
            lines.push("      </ul>".to_string());
        }
        lines.push("    </div>".to_string());
    }
    lines.push("  </section>".to_string());

    section_start(&mut lines, "Publications");
    lines.push("    <ol class=\"cv-publication-list\">".to_string());
    for publication in &cv.publications {
        lines.push("      <li>".to_string());
        lines.push(format!(
            "        <span class=\"cv-pub-title\">{}</span>",
            publication.title_html
        ));
        lines.push(format!(
            "        <span class=\"cv-pub-authors\">{}</span>",
            publication.authors_html
        ));
        lines.push(format!(
            "        <span class=\"cv-pub-venue\">{}</span>",
            publication.venue_html
        ));
        lines.push("      </li>".to_string());
    }
    lines.push("    </ol>".to_string());
    lines.push(
        "    <p class=\"cv-footnote\"><em>* denotes equal contribution.</em></p>".to_string(),
    );
    lines.push("  </section>".to_string());

    section_start(&mut lines, "Honors &amp; Awards");
    lines.push("    <ul class=\"cv-honor-list\">".to_string());
    for honor in &cv.honors {
        lines.push(format!(
            "      <li><span><strong>{}</strong>, {}</span><span>{}</span></li>",
            escape_html(&honor.name),
            escape_html(&honor.institution),
            escape_html(&honor.year)
        ));
    }
    lines.push("    </ul>".to_string());
    lines.push("  </section>".to_string());

    section_start(&mut lines, "Academic Service");
    for group in &cv.service {
        lines.push("    <div class=\"cv-service\">".to_string());
        lines.push(format!(
            "      <div class=\"cv-service-heading\">{}</div>",
            escape_html(&group.heading)
        ));
        lines.push("      <ul class=\"cv-service-list\">".to_string());
        for item in &group.items {
            lines.push(format!("        <li>{}</li>", escape_html(item)));
        }
        lines.push("      </ul>".to_string());
        lines.push("    </div>".to_string());
    }
    lines.push("  </section>".to_string());

    lines.push(format!(
        "  <p class=\"cv-last-updated\">Last updated: {}.</p>",
        escape_html(&cv.last_updated)
    ));
    lines.push("</div>".to_string());

    lines.join("\n")
}
