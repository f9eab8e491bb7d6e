//! `sdk-doctor diagnose` contract tests
//!
//! Drives the binary against small project trees and checks exit codes,
//! text output and the JSON report shape.

use std::path::Path;
use std::process::Command;

fn sdk_doctor_bin() -> &'static str {
    env!("CARGO_BIN_EXE_sdk-doctor")
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn healthy_android() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "app/build.gradle",
        r#"
android {
    defaultConfig {
        minSdk 28
    }
}

dependencies {
    implementation "com.trustarc:trustarc-consent-sdk:2025.01.1"
}
"#,
    );
    write(
        dir.path(),
        "app/src/main/AndroidManifest.xml",
        r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android">
    <uses-permission android:name="android.permission.INTERNET" />
    <uses-permission android:name="android.permission.ACCESS_NETWORK_STATE" />
</manifest>
"#,
    );
    write(
        dir.path(),
        "app/src/main/java/com/example/App.kt",
        r#"import com.truste.androidmobileconsentsdk.TrustArc
import com.truste.androidmobileconsentsdk.SdkMode

class App : Application() {
    override fun onCreate() {
        super.onCreate()
        val trustArc = TrustArc(this, SdkMode.Standard)
        trustArc.enableDebugLog(true)
        trustArc.addConsentListener { }
        trustArc.start("mac_trustarc.com")
    }
}
"#,
    );
    dir
}

fn failing_android() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "app/build.gradle",
        "android {\n    defaultConfig {\n        minSdk 21\n    }\n}\n",
    );
    dir
}

fn run_diagnose(dir: &Path, extra_args: &[&str]) -> (i32, String, String) {
    let output = Command::new(sdk_doctor_bin())
        .arg("diagnose")
        .arg(dir)
        .arg("--no-color")
        .args(extra_args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run sdk-doctor");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn parse_report(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Invalid JSON")
}

// ============================================================================
// Exit codes
// ============================================================================

#[test]
fn test_healthy_project_passes() {
    let dir = healthy_android();
    let (code, stdout, _) = run_diagnose(dir.path(), &["--json"]);
    assert_eq!(code, 0, "{stdout}");

    let report = parse_report(&stdout);
    assert_eq!(report["platform"], "android");
    assert!(report["score"].as_u64().unwrap() >= 90, "{stdout}");
    assert_eq!(report["summary"]["error"], 0);
}

#[test]
fn test_unrelated_start_before_construction_is_not_flagged() {
    let dir = healthy_android();
    write(
        dir.path(),
        "app/src/main/java/com/example/App.kt",
        r#"import com.truste.androidmobileconsentsdk.TrustArc
class App : Application() {
    override fun onCreate() {
        workerThread.start()
        val trustArc = TrustArc(this, SdkMode.Standard)
        trustArc.enableDebugLog(true)
        trustArc.addConsentListener { }
        trustArc.start(domainName = "x.com")
        trustArc.openCM()
    }
}
"#,
    );
    let (code, stdout, _) = run_diagnose(dir.path(), &["--json"]);
    assert_eq!(code, 0, "{stdout}");

    let report = parse_report(&stdout);
    assert!(report["score"].as_u64().unwrap() >= 90, "{stdout}");
    assert_eq!(report["summary"]["error"], 0, "{stdout}");
    assert_eq!(report["summary"]["warning"], 0, "{stdout}");
}

#[test]
fn test_failing_project_exits_one() {
    let dir = failing_android();
    let (code, stdout, _) = run_diagnose(dir.path(), &[]);
    assert_eq!(code, 1);
    assert!(stdout.contains("TrustArc SDK Integration Report"));
    assert!(stdout.contains("ERRORS"));
}

#[test]
fn test_low_min_sdk_names_required_level() {
    let dir = failing_android();
    let (code, stdout, _) = run_diagnose(dir.path(), &["--json"]);
    assert_eq!(code, 1);

    let report = parse_report(&stdout);
    assert!(report["score"].as_u64().unwrap() < 70);
    let findings = report["findings"].as_array().unwrap();
    assert!(findings.iter().any(|f| {
        f["severity"] == "error"
            && f["category"] == "Compatibility"
            && f["message"].as_str().unwrap().contains("28")
    }));
}

#[test]
fn test_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_diagnose(&dir.path().join("does-not-exist"), &[]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("does-not-exist"), "{stderr}");
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_json_report_shape() {
    let dir = healthy_android();
    let (_, stdout, _) = run_diagnose(dir.path(), &["--json"]);
    let report = parse_report(&stdout);

    for key in ["platform", "projectPath", "score", "findings", "summary", "generatedAt"] {
        assert!(report.get(key).is_some(), "missing {key}");
    }
    let first = &report["findings"][0];
    assert!(first.get("severity").is_some());
    assert!(first.get("category").is_some());
    assert!(first.get("message").is_some());
}

#[test]
fn test_output_file_keeps_stdout_clean() {
    let dir = healthy_android();
    let out = tempfile::tempdir().unwrap();
    let out_path = out.path().join("report.json");
    let (code, stdout, stderr) =
        run_diagnose(dir.path(), &["--json", "--output", out_path.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.trim().is_empty());
    assert!(stderr.contains("report.json"));

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(parse_report(&written)["platform"], "android");
}

#[test]
fn test_unknown_project_reports_reduced_confidence() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "README.md", "# nothing here\n");
    let (code, stdout, _) = run_diagnose(dir.path(), &["--json"]);
    assert_eq!(code, 1);
    let report = parse_report(&stdout);
    assert_eq!(report["platform"], "unknown");
    assert_eq!(report["score"], 50);
}

#[test]
fn test_repeated_runs_agree() {
    let dir = failing_android();
    let (_, first, _) = run_diagnose(dir.path(), &["--json"]);
    let (_, second, _) = run_diagnose(dir.path(), &["--json"]);
    let (a, b) = (parse_report(&first), parse_report(&second));
    assert_eq!(a["findings"], b["findings"]);
    assert_eq!(a["score"], b["score"]);
}
