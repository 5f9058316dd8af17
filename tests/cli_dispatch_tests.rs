use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_spellres")
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn run(args: &[&str], results: &Path) -> Output {
    Command::new(bin())
        .args(args)
        .env("SPELLRES_DATA_DIR", fixtures().join("data"))
        .env("SPELLRES_REPORTS_DIR", fixtures().join("reports"))
        .env("SPELLRES_RESULTS_DIR", results)
        .env_remove("RUST_LOG")
        .output()
        .expect("spellres should run")
}

#[test]
fn no_command_prints_usage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(&[], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: spellres"));
}

#[test]
fn scan_requires_exactly_one_target() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert_eq!(run(&["scan"], dir.path()).status.code(), Some(2));
    assert_eq!(
        run(&["scan", "--zone", "1000", "--enemy", "12264"], dir.path()).status.code(),
        Some(2)
    );
    assert_eq!(
        run(&["scan", "--enemy", "12264", "--ignore-curses", "--curse-only"], dir.path())
            .status
            .code(),
        Some(2)
    );
}

#[test]
fn scan_rejects_unknown_schools() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(&["scan", "--enemy", "12264", "--schools", "fire,holy"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown magic school 'holy'"));
}

#[test]
fn scan_unknown_enemy_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(&["scan", "--enemy", "1"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no enemy with id 1"));
}

#[test]
fn scan_writes_result_document_and_show_reads_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(
        &["scan", "--enemy", "12264", "--schools", "fire,frost", "--workers", "2"],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Shazzrah (12264)"));
    assert!(stdout.contains("61.72"));

    let path = dir.path().join("12264.json");
    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("result written"))
            .expect("result is json");
    assert_eq!(payload["enemyID"], 12264);
    assert_eq!(payload["tables"][0][0], "school");
    assert_eq!(payload["tables"][2][2], 8);

    let path_arg = path.to_string_lossy().to_string();
    let shown = run(&["show", &path_arg, "--csv"], dir.path());
    assert_eq!(shown.status.code(), Some(0));
    let csv = String::from_utf8_lossy(&shown.stdout);
    assert!(csv.starts_with("school,res,#,miss,full,25%,50%,75%\n"));
    assert!(csv.contains("fire,61.72,8,1,4,1,1,1"));
}

#[test]
fn show_without_path_prints_usage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(&["show"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: spellres show"));
}

#[test]
fn zones_lists_the_catalog() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(&["zones"], dir.path());
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Zone: Molten Core (1000)"));
    assert!(stdout.contains("## Encounter: Ragnaros (672)"));
    assert!(stdout.contains("### Enemy: Shazzrah (12264)"));

    assert_eq!(run(&["zones", "42"], dir.path()).status.code(), Some(1));
}

#[test]
fn estimate_prints_resistance_and_sentinels() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(&["estimate", "1", "1", "1", "1", "4"], dir.path());
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("partial: 21.43%"));
    assert!(stdout.contains("resistance: 61.72"));

    let immune = run(&["estimate", "60", "0", "0", "0", "0", "--school", "shadow"], dir.path());
    assert!(String::from_utf8_lossy(&immune.stdout).contains("resistance: IMMUNE"));

    let frost = run(&["estimate", "0", "0", "0", "1", "3", "--school", "frost"], dir.path());
    assert!(String::from_utf8_lossy(&frost.stdout).contains("resistance: 25"));

    assert_eq!(run(&["estimate", "1", "2"], dir.path()).status.code(), Some(2));
}
