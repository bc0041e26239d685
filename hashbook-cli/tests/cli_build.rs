use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().ok_or("no parent")?)?;
    fs::write(path, content)?;
    Ok(())
}

fn hashbook() -> Result<Command, Box<dyn std::error::Error>> {
    #[allow(deprecated)]
    let cmd = Command::cargo_bin("hashbook")?;
    Ok(cmd)
}

fn sitemap_locations(xml: &str) -> Vec<String> {
    xml.lines()
        .filter_map(|line| line.trim().strip_prefix("<loc>"))
        .filter_map(|line| line.strip_suffix("</loc>"))
        .map(str::to_string)
        .collect()
}

#[test]
fn build_two_document_site() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "content/index.md", "---\ntitle: Home\n---\nWelcome home.")?;
    write(
        dir.path(),
        "content/guide/intro.md",
        "---\ntitle: Introduction\nweight: 1\n---\n# Start\n\nRead [[guide|the guide]] first.",
    )?;

    hashbook()?
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .success();

    let public = dir.path().join("public");
    let db: Value = serde_json::from_str(&fs::read_to_string(public.join("db.json"))?)?;

    let pages = db["pages"].as_object().ok_or("pages object")?;
    assert_eq!(pages.len(), 2);
    assert_eq!(db["pages"]["/"]["title"], "Home");
    assert_eq!(db["pages"]["/guide/intro"]["title"], "Introduction");
    assert_eq!(db["pages"]["/guide/intro"]["weight"], 1);
    assert_eq!(db["pages"]["/guide/intro"]["toc"][0]["id"], "start");
    assert!(db["pages"]["/guide/intro"]["content"]
        .as_str()
        .ok_or("content string")?
        .contains(r##"href="#/guide">the guide</a>"##));

    let menu = db["menu"].as_array().ok_or("menu array")?;
    assert_eq!(menu.len(), 2);
    assert_eq!(menu[0]["slug"], "/");
    assert_eq!(menu[1]["is_folder"], true);
    assert_eq!(menu[1]["children"][0]["slug"], "/guide/intro");

    let sitemap = fs::read_to_string(public.join("sitemap.xml"))?;
    let locs = sitemap_locations(&sitemap);
    assert_eq!(
        locs,
        vec!["https://mysite.com/", "https://mysite.com/#/guide/intro"]
    );
    assert!(sitemap.contains("<changefreq>weekly</changefreq>"));

    let index = fs::read_to_string(public.join("index.html"))?;
    assert!(index.contains("db.json"));

    Ok(())
}

#[test]
fn build_flags_override_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(
        dir.path(),
        "hashbook.yml",
        "site_title: \"Handbook\"\ninput_dir: \"missing\"\nbase_url: \"https://ignored.example\"\n",
    )?;
    write(dir.path(), "docs/page.md", "Body")?;

    hashbook()?
        .current_dir(dir.path())
        .args([
            "build",
            "--input",
            "docs",
            "--output",
            "site",
            "--base-url",
            "https://docs.example.com/",
        ])
        .assert()
        .success();

    let site = dir.path().join("site");
    let sitemap = fs::read_to_string(site.join("sitemap.xml"))?;
    assert_eq!(
        sitemap_locations(&sitemap),
        vec!["https://docs.example.com/#/page"]
    );

    let index = fs::read_to_string(site.join("index.html"))?;
    assert!(index.contains("<title>Handbook</title>"));
    assert!(!dir.path().join("public").exists());

    Ok(())
}

#[test]
fn build_replaces_previous_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "content/index.md", "Home")?;
    write(dir.path(), "public/stale.html", "old")?;

    hashbook()?
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .success();

    let public = dir.path().join("public");
    assert!(!public.join("stale.html").exists());
    assert!(public.join("db.json").exists());

    Ok(())
}

#[test]
fn build_without_input_fails_and_keeps_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "public/db.json", "{}")?;

    hashbook()?
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input directory not found"));

    assert_eq!(fs::read_to_string(dir.path().join("public/db.json"))?, "{}");

    Ok(())
}

#[test]
fn build_refuses_output_over_input() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "content/index.md", "Home")?;

    for output in ["content", "."] {
        hashbook()?
            .current_dir(dir.path())
            .args(["build", "--output", output])
            .assert()
            .failure()
            .stderr(predicate::str::contains("contains the input directory"));
    }

    assert_eq!(fs::read_to_string(dir.path().join("content/index.md"))?, "Home");
    assert!(!dir.path().join("content/db.json").exists());

    Ok(())
}

#[test]
fn build_reports_bad_document() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "content/bad.md", "---\ntitle: [unclosed\n---\nBody")?;

    hashbook()?
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.md"));

    assert!(!dir.path().join("public").exists());

    Ok(())
}

#[test]
fn verify_json_reports_problems() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(
        dir.path(),
        "content/index.md",
        "See [[nowhere]].\n\n{{ref:guide#missing}}\n\n{{ref:onlyslug}}",
    )?;
    write(dir.path(), "content/guide.md", "## Setup\n\nSteps.")?;

    let assert = hashbook()?
        .current_dir(dir.path())
        .args(["verify", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let summary: Value = serde_json::from_str(&stdout)?;
    assert_eq!(summary["pages"], 2);
    assert_eq!(summary["warnings"], 2);
    assert_eq!(summary["errors"], 1);

    let codes: Vec<&str> = summary["diagnostics"]
        .as_array()
        .ok_or("diagnostics array")?
        .iter()
        .filter_map(|d| d["code"].as_str())
        .collect();
    assert_eq!(codes, vec!["link.broken", "ref.unresolved", "ref.invalid"]);

    assert!(!dir.path().join("public").exists());

    Ok(())
}

#[test]
fn init_then_build() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let project = dir.path().join("site");

    hashbook()?
        .current_dir(dir.path())
        .args(["init", "site"])
        .assert()
        .success();

    assert!(project.join("hashbook.yml").exists());
    assert!(project.join("content/index.md").exists());
    assert!(project.join("content/guide/intro.md").exists());

    hashbook()?
        .current_dir(&project)
        .arg("build")
        .assert()
        .success();

    let db: Value = serde_json::from_str(&fs::read_to_string(project.join("public/db.json"))?)?;
    assert_eq!(db["pages"]["/"]["title"], "Home");
    assert_eq!(db["pages"]["/guide/intro"]["title"], "Introduction");

    hashbook()?
        .current_dir(&project)
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 warnings"));

    Ok(())
}

#[test]
fn init_refuses_to_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "hashbook.yml", "site_title: Mine\n")?;

    hashbook()?
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to overwrite"));

    assert_eq!(fs::read_to_string(dir.path().join("hashbook.yml"))?, "site_title: Mine\n");
    assert!(!dir.path().join("content").exists());

    Ok(())
}
