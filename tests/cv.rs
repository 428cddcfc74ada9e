use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;

const CONFIG: &str = "title: Ada Lovelace\nemail: ada (at) example.org\nurl: https://ada.example.org\n";

const PUBLICATIONS: &str = r#"
main:
  - title: Sketch of the Analytical Engine
    authors: Ada Lovelace*, Charles Babbage*, Luigi Menabrea
    conference: Scientific Memoirs 1843
  - title: Engines at Scale
    authors: Charles Babbage, Ada Lovelace
    conference: arXiv
  - title: Looms Workshop Note
    authors: Ada Lovelace and Joseph Jacquard
    conference: Workshop on Looms
"#;

const INDEX: &str = r#"---
layout: about
---
I work on the intersection of mathematics and machinery:

- **<span style="color: #00356B">Engines:</span>** General purpose computation.
- **<span style="color: #00356B">Music:</span>** Composing with machines.

## News
"#;

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("_data")).unwrap();
    fs::write(dir.path().join("_config.yml"), CONFIG).unwrap();
    fs::write(dir.path().join("_data/publications.yml"), PUBLICATIONS).unwrap();
    fs::write(dir.path().join("index.md"), INDEX).unwrap();
    dir
}

fn vita(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vita").unwrap();
    cmd.env("NO_COLOR", "1").arg("cv").arg("--root").arg(root);
    cmd
}

#[test]
fn full_run_writes_every_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = site();
    let output = vita(dir.path()).output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(stderr.contains("✓ wrote _data/cv_integrated.yml, assets/files/cv.tex, cv/index.html"), "{stderr}");

    let tex = fs::read_to_string(dir.path().join("assets/files/cv.tex"))?;
    let html = fs::read_to_string(dir.path().join("cv/index.html"))?;
    let data = fs::read_to_string(dir.path().join("_data/cv_integrated.yml"))?;

    assert!(tex.contains(r"\resumePublication{Sketch of the Analytical Engine}{\underline{\textbf{A. Lovelace}}*, C. Babbage*, et al. (Scientific Memoirs 1843)}"));
    assert!(tex.contains(r"\textbf{Engines}: General purpose computation., \textbf{Music}: Composing with machines."));
    assert!(html.contains("<li><strong>Engines:</strong> General purpose computation.</li>"));
    assert!(html.contains("C. Babbage, <span class=\"cv-me\">A. Lovelace</span>"));
    assert!(data.contains("email_link: ada@example.org"));

    // Conference, then workshop, then preprint.
    let conference = tex.find("Sketch of the Analytical Engine").unwrap();
    let workshop = tex.find("Looms Workshop Note").unwrap();
    let preprint = tex.find("Engines at Scale").unwrap();
    assert!(conference < workshop && workshop < preprint);
    Ok(())
}

#[test]
fn missing_lists_get_placeholders() {
    let dir = site();
    vita(dir.path()).assert().success();
    for file in ["_data/education.yml", "_data/honors.yml", "_data/service.yml"] {
        assert!(dir.path().join(file).exists(), "{file} not created");
    }
    let tex = fs::read_to_string(dir.path().join("assets/files/cv.tex")).unwrap();
    assert!(tex.contains("University Name"));
}

#[test]
fn no_init_leaves_site_untouched() {
    let dir = site();
    vita(dir.path()).arg("--no-init").assert().success();
    assert!(!dir.path().join("_data/education.yml").exists());
    assert!(dir.path().join("cv/index.html").exists());
}

#[test]
fn existing_lists_are_not_overwritten() {
    let dir = site();
    let honors = "items:\n  - name: Engine Prize\n    institution: Analytical Society\n    year: 1843\n";
    fs::write(dir.path().join("_data/honors.yml"), honors).unwrap();
    vita(dir.path()).assert().success();
    assert_eq!(fs::read_to_string(dir.path().join("_data/honors.yml")).unwrap(), honors);
    let html = fs::read_to_string(dir.path().join("cv/index.html")).unwrap();
    assert!(html.contains("<li><span><strong>Engine Prize</strong>, Analytical Society</span><span>1843</span></li>"));
}

#[test]
fn missing_title_is_fatal_and_writes_nothing() {
    let dir = site();
    fs::write(dir.path().join("_config.yml"), "email: ada (at) example.org\n").unwrap();
    vita(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("_config.yml"));
    assert!(!dir.path().join("assets/files/cv.tex").exists());
    assert!(!dir.path().join("cv/index.html").exists());
    assert!(!dir.path().join("_data/cv_integrated.yml").exists());
    assert!(!dir.path().join("_data/education.yml").exists());
}

#[test]
fn rerun_gives_identical_output() {
    let dir = site();
    vita(dir.path()).assert().success();
    let tex = fs::read_to_string(dir.path().join("assets/files/cv.tex")).unwrap();
    let html = fs::read_to_string(dir.path().join("cv/index.html")).unwrap();
    vita(dir.path()).assert().success();
    assert_eq!(fs::read_to_string(dir.path().join("assets/files/cv.tex")).unwrap(), tex);
    assert_eq!(fs::read_to_string(dir.path().join("cv/index.html")).unwrap(), html);
}

#[test]
fn stages_run_separately() {
    let dir = site();
    vita(dir.path()).args(["--stage", "latex"]).assert().failure();

    vita(dir.path()).args(["--stage", "data"]).assert().success();
    assert!(dir.path().join("_data/cv_integrated.yml").exists());
    assert!(!dir.path().join("assets/files/cv.tex").exists());

    vita(dir.path()).args(["--stage", "latex"]).assert().success();
    assert!(dir.path().join("assets/files/cv.tex").exists());
    assert!(!dir.path().join("cv/index.html").exists());

    vita(dir.path()).args(["--stage", "html"]).assert().success();
    assert!(dir.path().join("cv/index.html").exists());
}

#[test]
fn highlight_can_be_overridden() {
    let dir = site();
    vita(dir.path())
        .args(["--highlight", "Charles Babbage"])
        .assert()
        .success();
    let tex = fs::read_to_string(dir.path().join("assets/files/cv.tex")).unwrap();
    assert!(tex.contains(r"\resumePublication{Engines at Scale}{\underline{\textbf{C. Babbage}}, et al. (arXiv)}"));
    assert!(tex.contains(r"A. Lovelace*, \underline{\textbf{C. Babbage}}*, et al. (Scientific Memoirs 1843)"));
}
