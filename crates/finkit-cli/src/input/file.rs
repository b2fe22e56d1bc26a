use serde::de::DeserializeOwned;
use std::fs;

/// Deserialize the core input record stored in a JSON file.
///
/// Relative paths resolve against the working directory. Error messages
/// name the resolved path so a mistyped `--input` is easy to spot.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let resolved = std::env::current_dir()?.join(path);
    let shown = resolved.display();

    if !resolved.exists() {
        return Err(format!("File not found: {shown}").into());
    }
    if !resolved.is_file() {
        return Err(format!("Not a file: {shown}").into());
    }

    let contents =
        fs::read_to_string(&resolved).map_err(|e| format!("Failed to read '{shown}': {e}"))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{shown}' as input: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finkit_core::loans::LoanInput;

    #[test]
    fn test_reads_typed_input_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loan.json");
        fs::write(&path, r#"{"principal": 1000, "annual_rate": 5, "years": 2}"#).unwrap();

        let input: LoanInput = read_json(path.to_str().unwrap()).unwrap();
        assert_eq!(input.years, 2);
        assert_eq!(input.extra_payment, 0.0);
    }

    #[test]
    fn test_missing_file_and_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = read_json::<LoanInput>(missing.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
        let err = read_json::<LoanInput>(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Not a file"));
    }
}
