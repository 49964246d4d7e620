mod common;

use clap::Parser;
use common::utils::{assert_close, detect_fixture, fixture_path};
use field_detection::cli::commands::{
    cmd_batch, cmd_detect, list_pages, load_document, load_page, render_context, run_batch,
};
use field_detection::cli::config::{
    AppConfig, Cli, Commands, PageSource, build_detector_config, load_config, parse_config,
};
use field_detection::config::DetectorConfig;
use field_detection::detector::context::FormType;
use field_detection::report::console::{format_batch_report, format_context_report};

fn fixtures_dir() -> String {
    fixture_path("").to_string_lossy().trim_end_matches('/').to_string()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("field-detection-{}-{}", std::process::id(), name))
}

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_detect_minimal() {
    let cli = Cli::parse_from(["field-detection", "detect", "--file", "page.html"]);
    assert_eq!(cli.verbose, 0);
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Detect {
            source,
            format,
            threshold,
            diagnostic,
            trace,
            output,
        } => {
            assert_eq!(source.file.as_deref(), Some("page.html"));
            assert!(source.url.is_none());
            assert!(source.snapshot.is_none());
            assert!(format.is_none());
            assert!(threshold.is_none());
            assert!(!diagnostic);
            assert!(trace.is_none());
            assert!(output.is_none());
        }
        _ => panic!("Expected Detect command"),
    }
}

#[test]
fn cli_parse_detect_all_args() {
    let cli = Cli::parse_from([
        "field-detection",
        "-vv",
        "--config",
        "custom.yaml",
        "detect",
        "--snapshot",
        "dom.json",
        "--format",
        "json",
        "--threshold",
        "0.55",
        "--diagnostic",
        "--trace",
        "trace.jsonl",
        "-o",
        "out.json",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
    match cli.command {
        Commands::Detect {
            source,
            format,
            threshold,
            diagnostic,
            trace,
            output,
        } => {
            assert_eq!(source.snapshot.as_deref(), Some("dom.json"));
            assert_eq!(format.as_deref(), Some("json"));
            assert_eq!(threshold, Some(0.55));
            assert!(diagnostic);
            assert_eq!(trace.as_deref(), Some("trace.jsonl"));
            assert_eq!(output.as_deref(), Some("out.json"));
        }
        _ => panic!("Expected Detect command"),
    }
}

#[test]
fn cli_detect_requires_exactly_one_source() {
    assert!(Cli::try_parse_from(["field-detection", "detect"]).is_err());
    assert!(
        Cli::try_parse_from([
            "field-detection",
            "detect",
            "--file",
            "a.html",
            "--url",
            "https://example.com",
        ])
        .is_err()
    );
}

#[test]
fn cli_parse_batch() {
    let cli = Cli::parse_from(["field-detection", "batch", "--dir", "pages", "--format", "json"]);
    match cli.command {
        Commands::Batch {
            dir,
            format,
            output,
        } => {
            assert_eq!(dir, "pages");
            assert_eq!(format.as_deref(), Some("json"));
            assert!(output.is_none());
        }
        _ => panic!("Expected Batch command"),
    }
}

#[test]
fn cli_batch_requires_dir() {
    assert!(Cli::try_parse_from(["field-detection", "batch"]).is_err());
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn load_config_missing_file_returns_defaults() {
    let config = load_config(Some("/nonexistent/field-detection.yaml"));
    assert_eq!(config.detection, DetectorConfig::default());
    assert_eq!(config.output.format, "console");
    assert!(config.output.trace.is_none());
}

#[test]
fn load_config_malformed_file_returns_defaults() {
    let path = temp_path("malformed.yaml");
    std::fs::write(&path, "detection: [not, a, map").unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.detection, DetectorConfig::default());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn parse_config_partial_sections() {
    let yaml = r#"
detection:
  threshold: 0.5
  weights:
    base: 0.4
  label:
    proximity_distance: 90
  boosts:
    - pattern: promo
      boost: 0.1
output:
  format: json
  trace: run.jsonl
"#;
    let config = parse_config(yaml).unwrap();

    assert_close(config.detection.threshold, 0.5);
    assert_close(config.detection.diagnostic_threshold, 0.3);
    assert_close(config.detection.weights.base, 0.4);
    assert_close(config.detection.weights.explicit_label, 0.15);
    assert_close(config.detection.label.proximity_distance, 90.0);
    assert_eq!(config.detection.label.max_length, 50);
    assert_eq!(config.detection.boosts.len(), 1);
    assert_eq!(config.detection.boosts[0].pattern, "promo");
    assert_eq!(config.output.format, "json");
    assert_eq!(config.output.trace.as_deref(), Some("run.jsonl"));
}

#[test]
fn parse_config_empty_document() {
    let config = parse_config("{}").unwrap();
    assert_eq!(config.detection, DetectorConfig::default());
}

#[test]
fn build_detector_config_precedence() {
    let file = DetectorConfig {
        threshold: 0.6,
        ..DetectorConfig::default()
    };

    let unchanged = build_detector_config(&file, None, false);
    assert_eq!(unchanged, file);

    let overridden = build_detector_config(&file, Some(0.45), false);
    assert_close(overridden.threshold, 0.45);
    assert_close(overridden.active_threshold(), 0.45);

    let diagnostic = build_detector_config(&file, None, true);
    assert!(diagnostic.diagnostic);
    assert_close(diagnostic.active_threshold(), 0.3);

    let diagnostic_custom = build_detector_config(&file, Some(0.25), true);
    assert_close(diagnostic_custom.active_threshold(), 0.25);
    assert_close(diagnostic_custom.threshold, 0.6);

    let clamped = build_detector_config(&file, Some(3.0), false);
    assert_close(clamped.threshold, 1.0);
}

// ============================================================================
// Page Loading Tests
// ============================================================================

#[test]
fn load_page_from_file_and_snapshot() {
    let file = fixture_path("login.html").to_string_lossy().to_string();
    let (label, document) = load_page(&PageSource {
        file: Some(file.clone()),
        url: None,
        snapshot: None,
    })
    .unwrap();
    assert_eq!(label, file);
    assert_eq!(document.title(), "Sign in");

    let snapshot = fixture_path("snapshot_login.json").to_string_lossy().to_string();
    let (_, document) = load_page(&PageSource {
        file: None,
        url: None,
        snapshot: Some(snapshot),
    })
    .unwrap();
    assert_eq!(document.url(), Some("https://example.com/login"));
}

#[test]
fn load_document_picks_parser_by_extension() {
    let snapshot = load_document(&fixture_path("snapshot_login.json")).unwrap();
    assert_eq!(snapshot.url(), Some("https://example.com/login"));

    let html = load_document(&fixture_path("contact.html")).unwrap();
    assert_eq!(html.title(), "Contact us");

    assert!(load_document(&fixture_path("missing.html")).is_err());
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn render_context_json_and_yaml() {
    let context = detect_fixture("contact.html");

    let json = render_context(&context, "json", "contact.html", 0).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["formType"], "contact");
    assert_eq!(value["fields"].as_array().unwrap().len(), 2);

    let yaml = render_context(&context, "yaml", "contact.html", 0).unwrap();
    assert!(yaml.contains("formType: contact"));
}

#[test]
fn console_report_lists_fields() {
    let context = detect_fixture("login.html");
    let report = render_context(&context, "console", "login.html", 0).unwrap();

    assert!(report.starts_with("=== login form: Sign in to an existing account ==="));
    assert!(report.contains("Source: login.html"));
    assert!(report.contains("username"));
    assert!(report.contains("[standard] *"));
    assert!(report.contains("2 of 2 fields kept at 0.40 (primary: standard)"));
    assert!(!report.contains("detected by"));
}

#[test]
fn verbose_console_report_shows_evidence_and_insights() {
    let context = detect_fixture("registration.html");
    let report = format_context_report(&context, "registration.html", 1);

    assert!(report.contains("- detected by standard at "));
    assert!(report.contains("privacy: High"));
    assert!(report.contains("form type confidence: 0.70"));
    assert!(report.contains("~ password -> confirm_password (Password verification pair)"));
}

#[test]
fn console_report_for_empty_page() {
    let context = detect_fixture("empty.html");
    let report = format_context_report(&context, "empty.html", 0);
    assert!(report.contains("(no fields detected)"));
    assert!(report.contains("(primary: none)"));
}

// ============================================================================
// Batch Tests
// ============================================================================

#[test]
fn list_pages_is_sorted_and_filtered() {
    let pages = list_pages(&fixtures_dir()).unwrap();
    let names: Vec<String> = pages
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names.len(), 10);
    assert_eq!(names[0], "checkout.html");
    assert!(names.contains(&"snapshot_login.json".to_string()));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn list_pages_missing_dir_is_an_error() {
    assert!(list_pages("/nonexistent/pages").is_err());
}

#[test]
fn run_batch_over_fixtures() {
    let pages = list_pages(&fixtures_dir()).unwrap();
    let report = run_batch(&pages, &DetectorConfig::default(), "fixtures");

    assert_eq!(report.suite_name, "fixtures");
    assert_eq!(report.total, 10);
    assert_eq!(report.failed, 0);
    assert_eq!(report.empty, 1);
    assert_eq!(report.with_fields, 9);
    assert!(report.all_succeeded());
    assert!(report.field_count > 20);

    let counts = report.form_type_counts();
    let login = counts.iter().find(|(t, _)| *t == FormType::Login).unwrap();
    assert_eq!(login.1, 3, "login.html, proximity.html, snapshot_login.json");

    let text = format_batch_report(&report);
    assert!(text.starts_with("=== Batch: fixtures ==="));
    assert!(text.contains("Pages: 9 with fields, 1 empty, 0 failed (10 total)"));
}

#[test]
fn run_batch_records_load_failures() {
    let dir = temp_path("batch");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("a_broken.json"), "{ not json").unwrap();
    std::fs::copy(fixture_path("contact.html"), dir.join("b_contact.html")).unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let pages = list_pages(dir.to_str().unwrap()).unwrap();
    assert_eq!(pages.len(), 2);

    let report = run_batch(&pages, &DetectorConfig::default(), "broken");
    assert_eq!(report.failed, 1);
    assert!(!report.all_succeeded());
    assert!(report.pages[0].context.error.as_deref().unwrap().contains("Invalid DOM snapshot"));
    assert_eq!(report.pages[1].context.form_type, FormType::Contact);

    let text = format_batch_report(&report.with_duration(1500));
    assert!(text.contains("[ERROR] Invalid DOM snapshot"));
    assert!(text.contains("in 1.5s"));

    let _ = std::fs::remove_dir_all(&dir);
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn cmd_detect_writes_output_file() {
    let output = temp_path("detect.json");
    let trace = temp_path("detect-trace.jsonl");
    let _ = std::fs::remove_file(&trace);

    let source = PageSource {
        file: Some(fixture_path("checkout.html").to_string_lossy().to_string()),
        url: None,
        snapshot: None,
    };
    let context = cmd_detect(
        &source,
        Some("json"),
        None,
        false,
        trace.to_str(),
        output.to_str(),
        0,
        &AppConfig::default(),
    )
    .unwrap();
    assert_eq!(context.form_type, FormType::Checkout);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["formType"], "checkout");

    let trace_lines = std::fs::read_to_string(&trace).unwrap().lines().count();
    assert_eq!(trace_lines, 8, "one event per phase");

    let _ = std::fs::remove_file(&output);
    let _ = std::fs::remove_file(&trace);
}

#[test]
fn cmd_detect_runs_without_an_openable_trace_file() {
    let trace = temp_path("missing-dir").join("trace.jsonl");
    let source = PageSource {
        file: Some(fixture_path("login.html").to_string_lossy().to_string()),
        url: None,
        snapshot: None,
    };
    let output = temp_path("detect-untraced.json");

    let context = cmd_detect(
        &source,
        Some("json"),
        None,
        false,
        trace.to_str(),
        output.to_str(),
        0,
        &AppConfig::default(),
    )
    .unwrap();
    assert_eq!(context.form_type, FormType::Login);
    assert!(!trace.exists());

    let _ = std::fs::remove_file(&output);
}

#[test]
fn cmd_batch_reports_success() {
    let output = temp_path("batch.json");
    let succeeded = cmd_batch(&fixtures_dir(), Some("json"), output.to_str(), &AppConfig::default()).unwrap();
    assert!(succeeded);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["total"], 10);
    assert_eq!(written["failed"], 0);

    let _ = std::fs::remove_file(&output);
}
