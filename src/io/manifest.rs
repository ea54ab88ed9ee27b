//! Run manifest: a `README.md` in the output directory recording how the
//! artifacts next to it were produced.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::AppError;

pub const MANIFEST_NAME: &str = "README.md";

/// Write the manifest for `argv` into `outdir` and return its path.
///
/// An existing manifest is overwritten; cached tables in `outdir` are left
/// alone, so the manifest describes the latest invocation only.
pub fn write_manifest(argv: &[String], outdir: &Path) -> Result<PathBuf, AppError> {
    create_dir_all(outdir)
        .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", outdir.display())))?;

    let path = outdir.join(MANIFEST_NAME);
    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create manifest: {e}")))?;

    let body = render_manifest(argv, outdir, &Local::now().to_rfc3339());
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write manifest: {e}")))?;

    Ok(path)
}

fn render_manifest(argv: &[String], outdir: &Path, generated: &str) -> String {
    let mut out = String::new();
    out.push_str("# rc run\n\n");
    out.push_str(&format!("- generated: {generated}\n"));
    out.push_str(&format!("- version: {}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!("- outdir: {}\n", outdir.display()));
    out.push_str("\n## Command\n\n```\n");
    out.push_str(&argv.join(" "));
    out.push_str("\n```\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_records_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let outdir = dir.path().join("run");
        let argv = vec![
            "rc".to_string(),
            "--res".to_string(),
            "results.csv".to_string(),
        ];

        let path = write_manifest(&argv, &outdir).unwrap();
        assert_eq!(path, outdir.join("README.md"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("rc --res results.csv"));
        assert!(text.contains("- generated: "));
    }

    #[test]
    fn render_is_deterministic_given_timestamp() {
        let a = render_manifest(&["rc".to_string()], Path::new("/tmp/out"), "T");
        let b = render_manifest(&["rc".to_string()], Path::new("/tmp/out"), "T");
        assert_eq!(a, b);
        assert!(a.contains("- outdir: /tmp/out\n"));
    }
}
