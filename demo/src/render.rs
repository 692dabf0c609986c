//! Plain-text rendering for the CLI.

use std::io::{self, Write};

use hemaguard_contracts::report::{FeatureWeight, InferenceReport};

/// The single-patient report.
pub fn write_report(out: &mut impl Write, report: &InferenceReport) -> io::Result<()> {
    let triage = &report.triage;

    writeln!(out, "=== Anemia Triage Report ===")?;
    writeln!(out, "  Report id:        {}", report.id)?;
    writeln!(out, "  Generated:        {}", report.created_at.to_rfc3339())?;
    writeln!(out)?;

    if triage.outlier_alert {
        writeln!(out, "  OUTLIER ALERT: {}", triage.recommendation)?;
        writeln!(out)?;
    }

    writeln!(out, "  Prediction:       {}", report.prediction.label)?;
    writeln!(out, "  P(anemic):        {:.1}%", report.prediction.probability * 100.0)?;
    writeln!(out, "  Confidence:       {:.1}%", report.prediction.confidence() * 100.0)?;
    writeln!(out, "  Mentzer index:    {:.2}", report.mentzer_index)?;
    if let Some(severity) = triage.severity {
        writeln!(out, "  Severity:         {}", severity)?;
    }
    if let Some(cause) = triage.suggested_cause {
        writeln!(out, "  Suggested cause:  {}", cause)?;
    }
    if !triage.outlier_alert {
        writeln!(out, "  Recommendation:   {}", triage.recommendation)?;
    }
    writeln!(out, "  Rule:             {}", triage.rule_id)?;
    writeln!(out)?;
    writeln!(out, "  Why this result?")?;
    writeln!(out, "  {}", report.explanation)?;
    writeln!(out)?;
    write_importances(out, &report.ranked_importances)
}

/// Importance table, heaviest first, with a proportional bar.
pub fn write_importances(out: &mut impl Write, ranked: &[FeatureWeight]) -> io::Result<()> {
    writeln!(out, "  Feature importance")?;
    let width = ranked.iter().map(|w| w.feature.len()).max().unwrap_or(0);
    for w in ranked {
        let bar = "#".repeat((w.weight * 40.0).round() as usize);
        writeln!(
            out,
            "    {:<width$}  {:>5.1}%  {}",
            w.feature,
            w.weight * 100.0,
            bar,
            width = width
        )?;
    }
    Ok(())
}
