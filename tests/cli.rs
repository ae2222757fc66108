use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const SAMPLE_EXPORT: &str = "\
Datum;Omschrijving;Bedrag;Naam tegenpartij;Adres tegenpartij;gestructureerde mededeling;Vrije mededeling;Saldo
01/03/2023;Albert Heijn 1337 AMSTERDAM;-42,50;Albert Heijn;Amsterdam;;;1000,00
02/03/2023;Salaris maart;2500,00;Werkgever BV;;;Salaris;3500,00
";

fn kasboek(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kasboek").unwrap();
    cmd.env("HOME", home);
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("kasboek")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("status"))
                .and(predicate::str::contains("review"))
                .and(predicate::str::contains("groups"))
                .and(predicate::str::contains("export")),
        );
}

#[test]
fn test_init_creates_data_layout() {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("boeken");

    kasboek(home.path())
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(data_dir.join("raw_data").is_dir());
    assert!(home
        .path()
        .join(".config")
        .join("kasboek")
        .join("settings.json")
        .is_file());
}

#[test]
fn test_status_without_raw_exports_fails_with_hint() {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("boeken");

    kasboek(home.path())
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success();

    kasboek(home.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no raw exports"));
}

#[test]
fn test_export_end_to_end() {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("boeken");

    kasboek(home.path())
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success();

    fs::write(data_dir.join("raw_data").join("maart.csv"), SAMPLE_EXPORT).unwrap();

    let out_path = home.path().join("export.csv");
    kasboek(home.path())
        .args(["export", "--output", out_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 transactions exported"));

    let exported = fs::read_to_string(&out_path).unwrap();
    let mut lines = exported.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Datum;Omschrijving;Bedrag;Naam tegenpartij;Adres tegenpartij;\
         gestructureerde mededeling;Vrije mededeling;Saldo;Category;Split"
    );
    assert!(exported.contains("01/03/2023;Albert Heijn 1337 AMSTERDAM;-42.5;"));
    assert!(exported.contains(";Other;0"));
}

#[test]
fn test_duplicate_rows_collapse_across_files() {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("boeken");

    kasboek(home.path())
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success();

    // The same export dropped twice must not double the table.
    fs::write(data_dir.join("raw_data").join("a.csv"), SAMPLE_EXPORT).unwrap();
    fs::write(data_dir.join("raw_data").join("b.csv"), SAMPLE_EXPORT).unwrap();

    let out_path = home.path().join("export.csv");
    kasboek(home.path())
        .args(["export", "--output", out_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 transactions exported"));
}
