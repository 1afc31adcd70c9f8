use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn check_detects_unformatted_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("demo.js");
    fs::write(&file, "if(true){var x=1;}\n").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg("--check")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs formatting"));
}

#[test]
fn check_passes_when_formatted() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("demo.js");
    fs::write(&file, "if (true) {\n    var x = 1;\n}\n").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg("--check")
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn formats_to_stdout_by_default() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("demo.js");
    fs::write(&file, "var x=1;\n").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("var x = 1;"));
}

#[test]
fn in_place_rewrites_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("demo.js");
    fs::write(&file, "do{x();}while(cond);\n").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg("-i")
        .arg(&file)
        .assert()
        .success();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg("--check")
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn check_and_in_place_conflict() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("demo.js");
    fs::write(&file, "var x = 1;\n").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg("--check")
        .arg("-i")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn walks_directories_for_js_files() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("a.js"), "var a=1;\n").unwrap();
    fs::write(nested.join("skip.txt"), "not javascript\n").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg("--check")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("a.js"));
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("demo.js");
    fs::write(&file, "if(true){var x=1;}\n").unwrap();

    let config_path = dir.path().join("js-fmt.toml");
    fs::write(&config_path, "indent_size = 2\n").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg("-i")
        .arg("--config")
        .arg(&config_path)
        .arg(&file)
        .assert()
        .success();

    let contents = fs::read_to_string(&file).unwrap();
    assert_eq!(contents, "if (true) {\n  var x = 1;\n}\n");
}

#[test]
fn bad_config_values_fall_back_silently() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("demo.js");
    fs::write(&file, "if(true){var x=1;}\n").unwrap();

    let config_path = dir.path().join("js-fmt.toml");
    fs::write(&config_path, "indent_size = \"bad\"\nunknown_option = true\n").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("js-fmt"))
        .arg("-i")
        .arg("--config")
        .arg(&config_path)
        .arg(&file)
        .assert()
        .success();

    let contents = fs::read_to_string(&file).unwrap();
    assert_eq!(contents, "if (true) {\n    var x = 1;\n}\n");
}
