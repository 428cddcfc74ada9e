use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cv::source::DEFAULT_RESEARCH_ANCHOR;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch citation metrics from Google Scholar, falling back to the last saved copy
    Fetch {
        /// Scholar user id, as in `citations?user=<ID>`
        #[arg(long, env = "GOOGLE_SCHOLAR_ID", value_name = "ID")]
        scholar_id: Option<String>,

        /// Directory that holds `gs_data.json` and the badge file
        #[arg(long, default_value = "results")]
        out: PathBuf,

        /// YAML file with name, affiliation and email to fill in
        #[arg(long, value_name = "FILE")]
        identity: Option<PathBuf>,

        #[arg(long, default_value = "https://scholar.google.com", value_name = "URL")]
        base_url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10, value_name = "SECS")]
        timeout: u64,
    },
    /// Write citation data from a hand-maintained YAML publication list
    Manual {
        #[arg(long, value_name = "FILE")]
        from: PathBuf,

        #[arg(long, default_value = "results")]
        out: PathBuf,
    },
    /// Generate the LaTeX and HTML curriculum vitae from the site's content
    Cv {
        /// Root of the site checkout
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Run a single stage instead of the whole pipeline
        #[arg(long, value_enum)]
        stage: Option<Stage>,

        /// Author to emphasise in publication lists (defaults to the site title)
        #[arg(long, value_name = "NAME")]
        highlight: Option<String>,

        /// Sentence that introduces the research bullets in `index.md`
        #[arg(long, default_value = DEFAULT_RESEARCH_ANCHOR, value_name = "TEXT")]
        research_anchor: String,

        /// Do not write placeholder data files for missing lists
        #[arg(long)]
        no_init: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Build `_data/cv_integrated.yml` only
    Data,
    /// Render `assets/files/cv.tex` from the integrated data
    Latex,
    /// Render `cv/index.html` from the integrated data
    Html,
}
