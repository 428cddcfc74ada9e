use super::CvRecord;
use crate::text::escape_latex;

/// Resume template preamble, adapted from sb2nov/resume (MIT).
const PREAMBLE: &str = r"%-------------------------
% Resume in LaTeX (auto-generated, do not edit by hand)
% Based off of: https://github.com/sb2nov/resume
% License : MIT
%------------------------

\documentclass[letterpaper,11pt]{article}

\usepackage{latexsym}
\usepackage[empty]{fullpage}
\usepackage{titlesec}
\usepackage{marvosym}
\usepackage[usenames,dvipsnames]{color}
\usepackage{verbatim}
\usepackage{enumitem}
\usepackage[hidelinks,colorlinks=true,urlcolor=black]{hyperref}
\usepackage{fancyhdr}
\usepackage[english]{babel}
\usepackage{tabularx}
\input{glyphtounicode}
\usepackage{charter}

\pagestyle{fancy}
\fancyhf{}
\fancyfoot{}
\renewcommand{\headrulewidth}{0pt}
\renewcommand{\footrulewidth}{0pt}

\addtolength{\oddsidemargin}{-0.5in}
\addtolength{\evensidemargin}{-0.5in}
\addtolength{\textwidth}{1in}
\addtolength{\topmargin}{-.5in}
\addtolength{\textheight}{1.0in}

\urlstyle{same}

\raggedbottom
\raggedright
\setlength{\tabcolsep}{0in}

\definecolor{mycolor}{RGB}{49, 89, 152}
\definecolor{urlcolor}{RGB}{44, 79, 152}
\definecolor{itemcolor}{RGB}{0, 0, 0}

\titleformat{\section}{
  \vspace{-4pt}\color{mycolor}\scshape\raggedright\large
}{}{0em}{}[\color{mycolor}\titlerule \vspace{-5pt}]

\pdfgentounicode=1

%-------------------------
% Custom commands
\newcommand{\resumeItem}[1]{
  \item\small{
    {#1 \vspace{-2pt}}
  }
}

\newcommand{\resumeSubheading}[4]{
  \vspace{-2pt}\item
    \begin{tabular*}{0.97\textwidth}[t]{l@{\extracolsep{\fill}}r}
      \textbf{#1} & #2 \\
      \textit{\small#3} & \textit{\small #4} \\
    \end{tabular*}\vspace{-5pt}
}

\renewcommand\labelitemii{$\vcenter{\hbox{\tiny$\bullet$}}$}

\newcommand{\resumeSubHeadingListStart}{\begin{itemize}[leftmargin=0.15in, label={}]}
\newcommand{\resumeSubHeadingListEnd}{\end{itemize}}
\newcommand{\resumeItemListStart}{\begin{itemize}[label={\color{itemcolor}\textbullet}]}
\newcommand{\resumeItemListEnd}{\end{itemize}\vspace{-5pt}}

\newcommand{\resumeText}{\vspace{3pt}}
\newcommand{\resumePosition}[1]{
    \item
    \begin{tabular*}{0.97\textwidth}{l}
      \small#1 \\
    \end{tabular*}\vspace{-7pt}
}
\newcommand{\resumeDataItem}[2]{
  \item\small{
    #1 \hfill #2 \vspace{-2pt}
  }
}
\newcommand{\resumePublication}[2]{
  \vspace{-2pt}\item
    \begin{tabular*}{0.97\textwidth}[t]{p{0.9\textwidth}@{\extracolsep{\fill}}r}
      \textbf{#1} & \\
      \textit{\small#2} & \\
    \end{tabular*}\vspace{-2pt}
}
\newcommand{\resumeHonor}[2]{
  \vspace{-2pt}\item
    {\small#1} \hfill {\small#2}
  \vspace{-7pt}
}

%-------------------------------------------
%%%%%%  RESUME STARTS HERE  %%%%%%%%%%%%%%%%%%%%%%%%%%%%

\begin{document}
";

/// `\href{url}{Label: \underline{url}}` for the contact line.
fn contact_link(target: &str, label: &str, shown: &str) -> String {
    format!(
        "\\href{{{target}}}{{{label}: \\underline{{{}}}}}",
        escape_latex(shown)
    )
}

/// Render the CV as a standalone LaTeX document.
pub fn render(cv: &CvRecord) -> String {
    let mut lines: Vec<String> = vec![PREAMBLE.to_string()];

    lines.push("%----------HEADING----------".to_string());
    lines.push("\\begin{center}".to_string());
    lines.push(format!(
        "    \\textbf{{\\Huge \\scshape \\color{{mycolor}}{}}} \\\\ \\vspace{{10pt}}",
        escape_latex(&cv.name)
    ));
    let contact = &cv.contact;
    let mut links = vec![contact_link(
        &format!("mailto:{}", contact.email_link),
        "Email",
        &contact.email_display,
    )];
    if let Some(homepage) = &contact.homepage {
        links.push(contact_link(homepage, "Homepage", homepage));
    }
    if let Some(github) = &contact.github {
        links.push(contact_link(github, "Github", github));
    }
    lines.push(format!("    {}\\\\ \\vspace{{3pt}}", links.join(" $|$ ")));
    lines.push("\\end{center}\n".to_string());
    lines.push("\\hypersetup{urlcolor=urlcolor}\n".to_string());

    lines.push("%-----------INTEREST-----------".to_string());
    lines.push("\\section{Research Interest}".to_string());
    lines.push(format!("\\resumeText{{{}}}\n", cv.research.latex));

    lines.push("%-----------EDUCATION-----------".to_string());
    lines.push("\\section{Education}".to_string());
    lines.push("  \\resumeSubHeadingListStart".to_string());
    for edu in &cv.education {
        lines.push("    \\resumeSubheading".to_string());
        lines.push(format!(
            "      {{{}}}{{{}}}",
            escape_latex(&edu.institution),
            escape_latex(&edu.location)
        ));
        lines.push(format!(
            "      {{{}}}{{{}}}",
            escape_latex(&edu.degree),
            escape_latex(&edu.dates)
        ));
        if !edu.details.is_empty() {
            lines.push("      \\resumeItemListStart".to_string());
            for detail in &edu.details {
                lines.push(format!(
                    "        \\resumeItem{{{}}}",
                    escape_latex(&detail.line())
                ));
            }
            lines.push("      \\resumeItemListEnd".to_string());
        }
    }
    lines.push("  \\resumeSubHeadingListEnd\n".to_string());

    lines.push("%-----------PUBLICATIONS-----------".to_string());
    lines.push("\\section{Publications}".to_string());
    lines.push("  \\resumeSubHeadingListStart".to_string());
    for publication in &cv.publications {
        lines.push(format!(
            "    \\resumePublication{{{}}}{{{} ({})}}",
            publication.title_latex, publication.authors_latex, publication.venue_latex
        ));
    }
    lines.push("  \\resumeSubHeadingListEnd\n".to_string());
    lines.push("\\vspace{-6pt}\\small{\\textit{* denotes equal contribution}}\n".to_string());

    lines.push("%-----------HONORS-----------".to_string());
    lines.push("\\section{Honors \\& Awards}".to_string());
    lines.push("  \\resumeSubHeadingListStart".to_string());
    for honor in &cv.honors {
        lines.push(format!(
            "    \\resumeHonor{{\\textbf{{{}}}, {}}}{{{}}}",
            escape_latex(&honor.name),
            escape_latex(&honor.institution),
            escape_latex(&honor.year)
        ));
    }
    lines.push("  \\resumeSubHeadingListEnd\n".to_string());

    lines.push("%-----------SERVICES-----------".to_string());
    lines.push("\\section{Services}".to_string());
    lines.push("  \\resumeSubHeadingListStart".to_string());
    for group in &cv.service {
        lines.push(format!(
            "    \\resumePosition{{\\textbf{{{}}}}}",
            escape_latex(&group.heading)
        ));
        lines.push("      \\resumeItemListStart".to_string());
        for item in &group.items {
            lines.push(format!("        \\resumeDataItem{{{}}}{{}}", escape_latex(item)));
        }
        lines.push("      \\resumeItemListEnd".to_string());
    }
    lines.push("  \\resumeSubHeadingListEnd\n".to_string());

    lines.push("\\vfill".to_string());
    lines.push("\\center{\\small Last updated: \\today}\n".to_string());
    lines.push("\\end{document}\n".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::{build, tests::{options, site}};

    #[test]
    fn document_is_wrapped_and_sectioned() {
        let tex = render(&build(&site(), &options()));
        assert!(tex.starts_with("%-------------------------"));
        assert!(tex.contains("\\begin{document}"));
        assert!(tex.trim_end().ends_with("\\end{document}"));
        let sections = [
            "\\section{Research Interest}",
            "\\section{Education}",
            "\\section{Publications}",
            "\\section{Honors \\& Awards}",
            "\\section{Services}",
        ];
        let positions: Vec<usize> = sections.iter().map(|s| tex.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn header_omits_missing_links() {
        let tex = render(&build(&site(), &options()));
        assert!(tex.contains(
            "\\href{mailto:ada@example.org}{Email: \\underline{ada@example.org}} $|$ \\href{https://ada.example.org}{Homepage: \\underline{https://ada.example.org}}\\\\ \\vspace{3pt}"
        ));
        assert!(!tex.contains("Github:"));
    }

    #[test]
    fn education_without_details_has_no_item_list() {
        let tex = render(&build(&site(), &options()));
        let edu = &tex[tex.find("\\section{Education}").unwrap()..tex.find("\\section{Publications}").unwrap()];
        assert!(edu.contains("{University of London}{London, UK}"));
        assert!(!edu.contains("\\resumeItemListStart"));
    }

    #[test]
    fn publication_line_combines_authors_and_venue() {
        let tex = render(&build(&site(), &options()));
        assert!(tex.contains(
            "\\resumePublication{Main Paper}{\\underline{\\textbf{A. Lovelace}}*, C. Babbage*, et al. (NeurIPS 2024)}"
        ));
    }

    #[test]
    fn service_items_are_escaped() {
        let tex = render(&build(&site(), &options()));
        assert!(tex.contains("\\resumeDataItem{Journal of Engines \\& Looms}{}"));
        assert!(tex.contains("\\resumeHonor{\\textbf{Engine Prize}, Analytical Society}{1843}"));
    }
}
