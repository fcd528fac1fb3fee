//! Output path naming

use jtrans_errors::ConfigError;
use std::path::{Path, PathBuf};

/// Prefix given to a derived output name
pub const OUTPUT_PREFIX: &str = "output_";

/// Resolve where the transformed input is written
///
/// An explicit output wins, except that a file input with an existing
/// directory as output lands inside that directory under its own name.
/// Without an explicit output the input's name gets the `output_` prefix.
///
/// # Errors
///
/// Returns an error if the input has no file name, if the output is the
/// input itself, or if the output exists and `overwrite` is not set.
pub fn resolve(input: &Path, output: Option<&Path>, overwrite: bool) -> Result<PathBuf, ConfigError> {
    let file_name = input.file_name().ok_or_else(|| ConfigError::InvalidValue {
        field: "input".to_string(),
        value: input.display().to_string(),
    })?;

    let resolved = match output {
        Some(output) if input.is_file() && output.is_dir() => output.join(file_name),
        Some(output) => output.to_path_buf(),
        None => input.with_file_name(format!("{OUTPUT_PREFIX}{}", file_name.to_string_lossy())),
    };

    if same_path(input, &resolved) {
        return Err(ConfigError::InvalidValue {
            field: "output".to_string(),
            value: format!("{} is the input", resolved.display()),
        });
    }

    if resolved.exists() && !overwrite {
        return Err(ConfigError::OutputExists {
            path: resolved.display().to_string(),
        });
    }

    Ok(resolved)
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_name() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("app.war");
        fs::write(&input, b"").unwrap();

        let output = resolve(&input, None, false).unwrap();
        assert_eq!(output, temp.path().join("output_app.war"));
    }

    #[test]
    fn test_default_output_name_for_directory() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("classes");
        fs::create_dir(&input).unwrap();

        let output = resolve(&input, None, false).unwrap();
        assert_eq!(output, temp.path().join("output_classes"));
    }

    #[test]
    fn test_output_directory_takes_input_name() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("app.jar");
        let out_dir = temp.path().join("out");
        fs::write(&input, b"").unwrap();
        fs::create_dir(&out_dir).unwrap();

        let output = resolve(&input, Some(&out_dir), false).unwrap();
        assert_eq!(output, out_dir.join("app.jar"));
    }

    #[test]
    fn test_existing_output_requires_overwrite() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("app.jar");
        let existing = temp.path().join("new.jar");
        fs::write(&input, b"").unwrap();
        fs::write(&existing, b"").unwrap();

        let err = resolve(&input, Some(&existing), false).unwrap_err();
        assert!(matches!(err, ConfigError::OutputExists { .. }));
        assert_eq!(resolve(&input, Some(&existing), true).unwrap(), existing);
    }

    #[test]
    fn test_output_must_differ_from_input() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("app.jar");
        fs::write(&input, b"").unwrap();

        let err = resolve(&input, Some(&input), true).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
