use crate::detector::context::FormContext;
use crate::field::field_model::FieldCandidate;
use crate::report::report_model::BatchReport;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Width of the label column before truncation.
const LABEL_WIDTH: usize = 28;

/// Format one detection result for terminal output.
///
/// Produces output like:
/// ```text
/// === contact form: Send a message or inquiry ===
/// Source: contact.html
///
///   0.97  message          Message                       textarea  [standard]
///   0.90  email            Email                         email     [standard] *
///
/// === 2 of 2 fields kept at 0.40 (primary: standard) in 3ms ===
/// ```
///
/// With `verbose > 0` each field is followed by its evidence trail.
pub fn format_context_report(context: &FormContext, source: &str, verbose: u8) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== {} form: {} ===\n",
        context.form_type,
        context.form_purpose
    ));
    out.push_str(&format!("Source: {}\n\n", source));

    if let Some(ref error) = context.error {
        out.push_str(&format!("    [ERROR] {}\n\n", error));
    }

    if context.fields.is_empty() {
        out.push_str("  (no fields detected)\n");
    }

    for field in &context.fields {
        out.push_str(&format_field_line(field));
        if verbose > 0 {
            for line in &field.evidence {
                out.push_str(&format!("        - {}\n", line));
            }
        }
    }

    if verbose > 0 && !context.fields.is_empty() {
        let insights = &context.insights;
        out.push_str(&format!(
            "\n  privacy: {:?}, complexity: {:?} ({:.1}), about {}\n",
            insights.privacy_level,
            insights.complexity,
            insights.complexity_score,
            insights.estimated_completion
        ));
        out.push_str(&format!(
            "  form type confidence: {:.2}\n",
            insights.form_type_confidence
        ));
        for rel in &insights.field_relationships {
            out.push_str(&format!(
                "    ~ {} -> {} ({})\n",
                rel.field, rel.related, rel.relationship
            ));
        }
    }

    let primary = context
        .detection_method
        .map(|m| m.to_string())
        .unwrap_or_else(|| "none".to_string());

    out.push_str(&format!(
        "\n=== {} of {} fields kept at {:.2}{} (primary: {}) in {}ms ===\n",
        context.filtered_field_count,
        context.raw_field_count,
        context.threshold_used,
        if context.lenient_fallback { " (lenient)" } else { "" },
        primary,
        context.timing_ms
    ));

    out
}

fn format_field_line(field: &FieldCandidate) -> String {
    let marker = if field.required { " *" } else { "" };
    let shadow = if field.in_shadow_dom { " (shadow)" } else { "" };

    format!(
        "  {:.2}  {:<16} {:<width$}  {:<9} [{}]{}{}\n",
        field.confidence,
        field.semantic_type.as_str(),
        truncate(&field.label, LABEL_WIDTH),
        field.html_kind,
        field.detection_method,
        shadow,
        marker,
        width = LABEL_WIDTH
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Format a batch run: one line per page plus a summary.
///
/// ```text
/// === Batch: fixtures ===
///
/// ✓ login.html        login     2 fields
/// ✗ broken.json       unknown   0 fields  [ERROR] Invalid DOM snapshot: ...
///
/// === Pages: 1 with fields, 0 empty, 1 failed (2 total) ===
/// ```
pub fn format_batch_report(report: &BatchReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Batch: {} ===\n\n", report.suite_name));

    for page in &report.pages {
        let marker = if page.context.error.is_some() {
            "\u{2717}"
        } else {
            "\u{2713}"
        };
        out.push_str(&format!(
            "{} {:<28} {:<13} {} fields",
            marker,
            page.page,
            page.context.form_type.as_str(),
            page.context.fields.len()
        ));
        if let Some(ref error) = page.context.error {
            out.push_str(&format!("  [ERROR] {}", error));
        }
        out.push('\n');
    }

    let types = report
        .form_type_counts()
        .iter()
        .map(|(t, n)| format!("{} {}", n, t))
        .collect::<Vec<_>>()
        .join(", ");
    if !types.is_empty() {
        out.push_str(&format!("\nForm types: {}\n", types));
    }

    out.push_str(&format!(
        "\n=== Pages: {} with fields, {} empty, {} failed ({} total)",
        report.with_fields, report.empty, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    out
}
