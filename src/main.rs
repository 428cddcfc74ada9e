use std::{fmt::Display, path::Path, time::Duration};

use anyhow::Context;
use chrono::{Local, Utc};
use clap::Parser;
use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, Command, Stage},
    cv::{BuildOptions, Outputs, source::SiteContent},
    scholar::{
        Identity, Outcome,
        strategy::{Client, STRATEGIES},
    },
};

mod authors;
mod cli;
mod cv;
mod scholar;
mod text;

fn init_logging(verbose: bool) {
    let default = if verbose { "vita=debug" } else { "vita=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn done(msg: impl Display) {
    eprintln!("{} {msg}", "✓".if_supports_color(Stream::Stderr, |t| t.green()));
}

fn degraded(msg: impl Display) {
    eprintln!("{} {msg}", "!".if_supports_color(Stream::Stderr, |t| t.yellow()));
}

fn fetch(
    scholar_id: Option<String>,
    out: &Path,
    identity: Option<&Path>,
    base_url: &str,
    timeout: u64,
) -> anyhow::Result<()> {
    let Some(user) = scholar_id.filter(|id| !id.trim().is_empty()) else {
        anyhow::bail!("no Scholar id given: pass --scholar-id or set GOOGLE_SCHOLAR_ID");
    };
    let identity = identity.map(Identity::load).transpose()?.unwrap_or_default();
    let client = Client::new(base_url, &user, Duration::from_secs(timeout))
        .with_context(|| format!("failed to set up a client for {base_url}"))?;

    let (record, outcome) =
        scholar::fetch_or_fallback(&client, STRATEGIES, out, &identity, Utc::now())?;
    scholar::write_outputs(out, &record)?;

    let citations = scholar::metric(&record, "citedby");
    match outcome {
        Outcome::Fetched(strategy) => done(format_args!(
            "{citations} citations, h-index {} ({strategy})",
            scholar::metric(&record, "hindex")
        )),
        Outcome::Cached => degraded(format_args!(
            "Scholar unavailable, kept cached data ({citations} citations)"
        )),
        Outcome::Placeholder => degraded("Scholar unavailable and nothing cached, wrote placeholder"),
    }
    Ok(())
}

fn manual(from: &Path, out: &Path) -> anyhow::Result<()> {
    let list = scholar::manual::ManualList::load(from)?;
    let profile = scholar::manual::build(&list, Utc::now());
    scholar::write_outputs(out, &profile.to_record()?)?;
    done(format_args!(
        "{} publications, {} citations, h-index {}",
        profile.publications.len(),
        profile.citedby,
        profile.hindex
    ));
    Ok(())
}

fn generate_cv(
    root: &Path,
    stage: Option<Stage>,
    highlight: Option<String>,
    research_anchor: &str,
    no_init: bool,
) -> anyhow::Result<()> {
    let written = match stage {
        None | Some(Stage::Data) => {
            let site = SiteContent::load(root, research_anchor)?;
            let options = BuildOptions {
                highlight,
                last_updated: Local::now().format("%B %d, %Y").to_string(),
            };
            let record = cv::build(&site, &options);
            if !no_init {
                cv::source::persist_missing_defaults(root)?;
            }
            let outputs = if stage.is_none() {
                Outputs::ALL
            } else {
                Outputs { integrated: true, latex: false, html: false }
            };
            cv::write_outputs(root, &record, outputs)?
        }
        Some(Stage::Latex) => cv::write_outputs(
            root,
            &cv::load_integrated(root)?,
            Outputs { integrated: false, latex: true, html: false },
        )?,
        Some(Stage::Html) => cv::write_outputs(
            root,
            &cv::load_integrated(root)?,
            Outputs { integrated: false, latex: false, html: true },
        )?,
    };
    done(format_args!("wrote {}", written.join(", ")));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);
    match args.command {
        Command::Fetch { scholar_id, out, identity, base_url, timeout } => {
            fetch(scholar_id, &out, identity.as_deref(), &base_url, timeout)
        }
        Command::Manual { from, out } => manual(&from, &out),
        Command::Cv { root, stage, highlight, research_anchor, no_init } => {
            generate_cv(&root, stage, highlight, &research_anchor, no_init)
        }
    }
}
