//! Command-level assembly and inspection against fragments on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use restdoc_cli::assemble::{AssembleArgs, AssemblySettings, assemble};
use restdoc_cli::config::AssembleConfig;
use restdoc_cli::inspect::inspect;
use restdoc_cli::selection::{Selection, SelectionArgs};
use restdoc_common::write_fragment;
use restdoc_model::{ApiGrouping, Endpoint, Fragment, HttpMethod};
use tempfile::TempDir;

fn write_fixture(build: &Path) {
    let widgets = Fragment::new("Widgets.java").grouping(
        ApiGrouping::named("UltimateApi")
            .title("Ultimate API")
            .base_path("${api.base}")
            .endpoint(Endpoint::new(HttpMethod::Get, "/mount/api/v1/widgets"))
            .endpoint(
                Endpoint::new(HttpMethod::Get, "/mount/api/v1/private")
                    .scopes(["private"]),
            ),
    );
    let other = Fragment::new("Other.java").grouping(
        ApiGrouping::named("OtherApi").endpoint(Endpoint::new(HttpMethod::Get, "/other")),
    );
    write_fragment(build, "Widgets.java", &widgets).unwrap();
    write_fragment(build, "Other.java", &other).unwrap();
}

fn selection(build: &Path) -> SelectionArgs {
    SelectionArgs {
        inputs: vec![build.to_path_buf()],
        defines: vec![("api.base".to_string(), "/ultimate".to_string())],
        ..SelectionArgs::default()
    }
}

#[test]
fn test_assemble_writes_one_file_per_grouping_and_format() {
    let dir = TempDir::new().unwrap();
    let build = dir.path().join("build");
    write_fixture(&build);

    let args = AssembleArgs {
        selection: selection(&build),
        output: Some(dir.path().join("docs")),
        name: Some("ApiLevelDocs".to_string()),
        formats: vec!["raml".to_string(), "html".to_string()],
    };
    let settings = AssemblySettings::resolve(args, &AssembleConfig::default());
    let summary = assemble(&settings).unwrap();
    assert!(summary.failed.is_empty());

    let mut names: Vec<_> = fs::read_dir(dir.path().join("docs"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "ApiLevelDocs-OtherApi.html",
            "ApiLevelDocs-OtherApi.raml",
            "ApiLevelDocs-UltimateApi.html",
            "ApiLevelDocs-UltimateApi.raml",
        ]
    );

    let raml = fs::read_to_string(dir.path().join("docs/ApiLevelDocs-UltimateApi.raml")).unwrap();
    assert!(raml.contains("baseUri: /ultimate"));
}

#[test]
fn test_missing_template_value_fails_assembly() {
    let dir = TempDir::new().unwrap();
    let build = dir.path().join("build");
    write_fixture(&build);

    let args = AssembleArgs {
        selection: SelectionArgs {
            inputs: vec![build],
            ..SelectionArgs::default()
        },
        output: Some(dir.path().join("docs")),
        ..AssembleArgs::default()
    };
    let settings = AssemblySettings::resolve(args, &AssembleConfig::default());
    let err = assemble(&settings).unwrap_err();
    assert!(err.contains("api.base"));
    assert!(!dir.path().join("docs").exists());
}

#[test]
fn test_unknown_format_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let build = dir.path().join("build");
    write_fixture(&build);

    let args = AssembleArgs {
        selection: selection(&build),
        output: Some(dir.path().join("docs")),
        formats: vec!["raml".to_string(), "pdf".to_string()],
        ..AssembleArgs::default()
    };
    let settings = AssemblySettings::resolve(args, &AssembleConfig::default());
    let err = assemble(&settings).unwrap_err();
    assert!(err.contains("pdf"));
    assert!(!dir.path().join("docs").exists());
}

#[test]
fn test_inspect_summary_respects_scope() {
    let dir = TempDir::new().unwrap();
    let build = dir.path().join("build");
    write_fixture(&build);

    let mut args = selection(&build);
    args.scope = Some("public".to_string());
    let selected = Selection::resolve(args, &AssembleConfig::default());
    let summary = inspect(&selected, true).unwrap();
    let lines: Vec<_> = summary.lines().collect();
    assert_eq!(lines.len(), 2);
    // Fragments load in file-name order, so Other.java comes first.
    assert!(lines[0].starts_with("OtherApi\t"));
    assert_eq!(lines[1], "UltimateApi\tUltimate API\t1 resources\t1 methods");
}

#[test]
fn test_run_end_to_end() {
    let dir = TempDir::new().unwrap();
    let build = dir.path().join("build");
    write_fixture(&build);
    let out: PathBuf = dir.path().join("out");

    let code = restdoc_cli::run(vec![
        "restdoc".to_string(),
        "assemble".to_string(),
        build.display().to_string(),
        "--output".to_string(),
        out.display().to_string(),
        "--format".to_string(),
        "json".to_string(),
        "--define".to_string(),
        "api.base=/ultimate".to_string(),
        "--config".to_string(),
        dir.path().join("absent.toml").display().to_string(),
    ]);
    assert_eq!(code, 1);
    assert!(!out.exists());

    fs::write(dir.path().join("restdoc.toml"), "[assemble]\nname = \"Configured\"\n").unwrap();
    let code = restdoc_cli::run(vec![
        "restdoc".to_string(),
        "assemble".to_string(),
        build.display().to_string(),
        "-o".to_string(),
        out.display().to_string(),
        "-f".to_string(),
        "json".to_string(),
        "-D".to_string(),
        "api.base=/ultimate".to_string(),
        "--config".to_string(),
        dir.path().join("restdoc.toml").display().to_string(),
    ]);
    assert_eq!(code, 0);
    assert!(out.join("Configured-UltimateApi.json").is_file());
}
