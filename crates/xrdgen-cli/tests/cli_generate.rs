//! Integration test: run the CLI handlers against a program manifest on disk.

use std::path::PathBuf;

use xrdgen_cli::generate::{run_generate, GenerateArgs};
use xrdgen_cli::kinds::list_kinds;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_generate_writes_file() {
    let out = tempfile::tempdir().unwrap();
    let args = GenerateArgs {
        program: fixture("program.yaml"),
        output_dir: Some(out.path().join("xrds")),
        year: Some("2024".into()),
        ..GenerateArgs::default()
    };
    let code = run_generate(&args).unwrap();
    assert_eq!(code, 0);

    let written = out.path().join("xrds").join("testdata.xplane.io_mockxrds.yaml");
    let contents = std::fs::read_to_string(written).unwrap();
    assert!(contents.starts_with("---\n"));
    assert!(contents.contains("kind: CompositeResourceDefinition"));
    assert!(contents.contains("name: mockxrds.testdata.xplane.io"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let args = GenerateArgs {
        program: fixture("program.yaml"),
        output_dir: Some(out.path().join("xrds")),
        dry_run: true,
        ..GenerateArgs::default()
    };
    assert_eq!(run_generate(&args).unwrap(), 0);
    assert!(!out.path().join("xrds").exists());
}

#[test]
fn test_config_file_and_header() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("header.txt");
    std::fs::write(&header, "# Copyright YEAR The Authors.\n").unwrap();
    let config = dir.path().join("xrdgen.yaml");
    std::fs::write(
        &config,
        format!(
            "maxDescLen: 0\nheaderFile: {}\noutputDir: {}\n",
            header.display(),
            dir.path().join("out").display()
        ),
    )
    .unwrap();

    let args = GenerateArgs {
        program: fixture("program.yaml"),
        config: Some(config),
        year: Some("2031".into()),
        ..GenerateArgs::default()
    };
    assert_eq!(run_generate(&args).unwrap(), 0);

    let contents =
        std::fs::read_to_string(dir.path().join("out").join("testdata.xplane.io_mockxrds.yaml"))
            .unwrap();
    assert!(contents.starts_with("# Copyright 2031 The Authors.\n---\n"));
    assert!(!contents.contains("description:"));
}

#[test]
fn test_missing_program_is_error() {
    let args = GenerateArgs {
        program: fixture("does-not-exist.yaml"),
        dry_run: true,
        ..GenerateArgs::default()
    };
    let err = run_generate(&args).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load program manifest"));
}

#[test]
fn test_list_kinds() {
    let kinds = list_kinds(&fixture("program.yaml")).unwrap();
    let names: Vec<String> = kinds.iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["MockXRD.testdata.xplane.io"]);
}
