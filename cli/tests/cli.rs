use assert_cmd::Command;
use predicates::prelude::*;

fn melee() -> Command {
    Command::cargo_bin("melee").unwrap()
}

#[test]
fn init_writes_the_sample_tables() {
    let dir = tempfile::tempdir().unwrap();
    melee()
        .args(["init", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("roster.json"))
        .stdout(predicate::str::contains("saving_throws.json"));
    assert!(dir.path().join("participants.json").exists());

    melee().args(["init", "--data-dir"]).arg(dir.path()).assert().failure();
}

#[test]
fn roster_lists_active_combatants_only() {
    let dir = tempfile::tempdir().unwrap();
    melee().args(["init", "--data-dir"]).arg(dir.path()).assert().success();
    melee()
        .args(["roster", "--seed", "7", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Encounter: 1 | Round: 1"))
        .stdout(predicate::str::contains("OANTG3"))
        .stdout(predicate::str::contains("AALIEL1"))
        .stdout(predicate::str::contains("OTROLL1").not());
}

#[test]
fn roll_is_reproducible_with_a_seed() {
    let args = ["roll", "--seed", "11", "--count", "3", "--sides", "6", "--times", "4"];
    let first = melee().args(args).output().unwrap();
    let second = melee().args(args).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    let totals: Vec<i32> = String::from_utf8(first.stdout)
        .unwrap()
        .lines()
        .map(|l| l.trim().parse().unwrap())
        .collect();
    assert_eq!(totals.len(), 4);
    assert!(totals.iter().all(|t| (3..=18).contains(t)));
}

#[test]
fn run_menu_lists_and_quits() {
    let dir = tempfile::tempdir().unwrap();
    melee().args(["init", "--data-dir"]).arg(dir.path()).assert().success();
    melee()
        .args(["run", "--seed", "3", "--data-dir"])
        .arg(dir.path())
        .write_stdin("2\n99\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("MELEE MANAGER"))
        .stdout(predicate::str::contains("OANTG1"));
}

#[test]
fn missing_data_dir_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    melee()
        .args(["roster", "--data-dir"])
        .arg(dir.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("roster.json"));
}
