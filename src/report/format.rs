//! Formatting of the end-of-run summary printed to stdout.
//!
//! Kept apart from the pipeline so output changes stay local and the text can
//! be tested without running anything.

use std::fmt::Write;

use crate::app::pipeline::RunOutput;

/// Format the full run summary (input stats, table status, skipped groups,
/// image counts).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();
    let un = &run.distinct;

    out.push_str("=== rc - sweep results ===\n");
    let _ = writeln!(out, "Input: {} ({} rows)", run.results_path.display(), run.rows_read);
    let _ = writeln!(
        out,
        "Distinct: nucleipref={} model={} nvertices={} avgdegree={} seed={} c={}",
        un.nucleipref.len(),
        un.model.len(),
        un.nvertices.len(),
        un.avgdegree.len(),
        un.seed.len(),
        un.c.len(),
    );
    let _ = writeln!(out, "Aggregated: {} records ({})", run.aggregated.rows.len(), run.aggregated.status.label());
    let _ = writeln!(out, "Fits: {} records ({})", run.coeffs.table.rows.len(), run.coeffs.table.status.label());

    if !run.coeffs.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped groups ({}):", run.coeffs.skipped.len());
        for s in &run.coeffs.skipped {
            let _ = writeln!(out, "  {:<32} {}", s.key.file_stem(), s.reason);
        }
    }

    out.push_str("\nImages:\n");
    for (family, count) in &run.images {
        let _ = writeln!(out, "  {family:<12} {count}");
    }
    let _ = write!(out, "Output: {}", run.outdir.display());
    out
}
