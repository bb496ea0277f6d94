use std::fs;
use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;

const REPORT: &str = r#"<html><body>
<div class="ReportTitle">Batch</div>
<table class="ReportTable"><tr class="ReportItem"><td>1</td><td>two</td></tr></table>
</body></html>"#;

const BROKEN: &str = "<html><body><p>no table</p></body></html>";

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn converts_directory_and_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("good.xls"), REPORT);
    write(&dir.path().join("Other.MHT"), REPORT);
    write(&dir.path().join("broken.xls"), BROKEN);
    write(&dir.path().join("notes.txt"), "ignored");
    write(&dir.path().join("nested/deep.xls"), REPORT);

    let output = Command::new(env!("CARGO_BIN_EXE_report2xlsx"))
        .arg(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), "converted=2 skipped=0 failed=1");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("FAILED"), "stderr: {stderr}");
    assert!(stderr.contains("broken.xls"), "stderr: {stderr}");

    assert!(dir.path().join("good.xlsx").exists());
    assert!(dir.path().join("Other.xlsx").exists());
    assert!(!dir.path().join("broken.xlsx").exists());
    // Not recursive by default.
    assert!(!dir.path().join("nested/deep.xlsx").exists());
}

#[test]
fn recursive_scan_into_output_dir_then_skip_existing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let out = dir.path().join("out");
    write(&input.join("a.xls"), REPORT);
    write(&input.join("sub/b.htm"), REPORT);

    let run = |extra: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_report2xlsx"))
            .arg("--recursive")
            .arg("--output-dir")
            .arg(&out)
            .args(extra)
            .arg(&input)
            .output()
            .unwrap()
    };

    let first = run(&[]);
    assert!(first.status.success(), "{first:?}");
    assert_eq!(
        String::from_utf8(first.stdout).unwrap().trim(),
        "converted=2 skipped=0 failed=0"
    );
    assert!(out.join("a.xlsx").exists());
    assert!(out.join("b.xlsx").exists());

    let second = run(&[]);
    assert!(second.status.success());
    assert_eq!(
        String::from_utf8(second.stdout).unwrap().trim(),
        "converted=0 skipped=2 failed=0"
    );

    let third = run(&["--overwrite"]);
    assert_eq!(
        String::from_utf8(third.stdout).unwrap().trim(),
        "converted=2 skipped=0 failed=0"
    );
}

#[test]
fn json_output_lists_each_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.xls");
    let missing = dir.path().join("missing.xls");
    write(&good, REPORT);

    let output = Command::new(env!("CARGO_BIN_EXE_report2xlsx"))
        .arg("--format")
        .arg("json")
        .arg("--fixed-styles")
        .arg(&good)
        .arg(&missing)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["converted"], 1);
    assert_eq!(json["failed"], 1);
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["status"], "converted");
    assert_eq!(files[0]["sheet_name"], "Batch");
    assert_eq!(files[1]["status"], "failed");
    assert!(files[1]["error"].as_str().unwrap().contains("missing.xls"));
}

#[test]
fn custom_extensions() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("report.rpt"), REPORT);
    write(&dir.path().join("report2.xls"), REPORT);

    let output = Command::new(env!("CARGO_BIN_EXE_report2xlsx"))
        .arg("--ext")
        .arg(".RPT")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap().trim(),
        "converted=1 skipped=0 failed=0"
    );
    assert!(dir.path().join("report.xlsx").exists());
}
