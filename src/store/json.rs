//! Stack file loading and saving

use std::path::Path;

use crate::entities::stackup::Stackup;
use crate::store::diagnostics::{JsonSyntaxError, StackFileError};

/// Parse stack file content with source-annotated errors
pub fn parse_stack(content: &str, filename: &str) -> Result<Stackup, StackFileError> {
    serde_json::from_str(content)
        .map_err(|e| StackFileError::Syntax(JsonSyntaxError::from_serde_error(&e, content, filename)))
}

/// Load a stack file from disk
pub fn load_stack(path: &Path) -> Result<Stackup, StackFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| StackFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stackup = parse_stack(&content, &path.display().to_string())?;
    tracing::debug!(
        path = %path.display(),
        contributors = stackup.contributor_count(),
        "loaded stack file"
    );
    Ok(stackup)
}

/// Pretty-printed JSON for a stack
pub fn to_json(stackup: &Stackup) -> Result<String, StackFileError> {
    let mut json =
        serde_json::to_string_pretty(stackup).map_err(|e| StackFileError::Serialize(e.to_string()))?;
    json.push('\n');
    Ok(json)
}

/// Stamp and write a stack file
pub fn save_stack(path: &Path, stackup: &mut Stackup) -> Result<(), StackFileError> {
    stackup.touch();
    let json = to_json(stackup)?;
    std::fs::write(path, json).map_err(|source| StackFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        contributors = stackup.contributor_count(),
        "saved stack file"
    );
    Ok(())
}

/// Write a new stack file, refusing to clobber unless `force` is set
pub fn create_stack(path: &Path, stackup: &mut Stackup, force: bool) -> Result<(), StackFileError> {
    if path.exists() && !force {
        return Err(StackFileError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    save_stack(path, stackup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::stackup::{Contributor, Direction};
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        crate::logging::init_test();
        let dir = tempdir().unwrap();
        let path = dir.path().join("stack.json");

        let mut stackup = Stackup::new("Gap", "Author");
        stackup.add_contributor(Contributor::new("A", 10.0, Direction::Positive, 0.1, None));
        save_stack(&path, &mut stackup).unwrap();
        assert!(stackup.timestamp.is_some());

        let loaded = load_stack(&path).unwrap();
        assert_eq!(loaded, stackup);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = load_stack(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(StackFileError::Io { .. })));
    }

    #[test]
    fn test_invalid_json_is_syntax_error() {
        let result = parse_stack("{\"stackData\": [", "broken.json");
        match result {
            Err(StackFileError::Syntax(e)) => assert_eq!(e.filename, "broken.json"),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stack.json");
        let mut stackup = Stackup::new("One", "Author");
        create_stack(&path, &mut stackup, false).unwrap();

        let mut other = Stackup::new("Two", "Author");
        assert!(matches!(
            create_stack(&path, &mut other, false),
            Err(StackFileError::AlreadyExists { .. })
        ));
        create_stack(&path, &mut other, true).unwrap();
        assert_eq!(load_stack(&path).unwrap().title(), "Two");
    }
}
