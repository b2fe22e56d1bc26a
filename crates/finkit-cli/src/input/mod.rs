pub mod file;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::{self, Read};

/// Typed input from `--input <file>` or piped stdin, in that order.
///
/// `None` means neither was given and the caller should build the input
/// from its flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    match read_piped(io::stdin().lock())? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// JSON document from a non-interactive reader; blank input is `None`.
fn read_piped<R: Read>(mut reader: R) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pipe_falls_back_to_flags() {
        assert!(read_piped(" \n\t".as_bytes()).unwrap().is_none());
    }

    #[test]
    fn test_piped_document_parsed() {
        let value = read_piped(r#"{"base_value": "100", "shocks": ["-10"]}"#.as_bytes())
            .unwrap()
            .unwrap();
        assert_eq!(value["base_value"], "100");
    }

    #[test]
    fn test_malformed_pipe_is_error() {
        assert!(read_piped("{not json".as_bytes()).is_err());
    }
}
