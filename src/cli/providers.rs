//! Dynamic choice sources the binary makes available to schemas

use std::fs;
use std::path::{MAIN_SEPARATOR, Path};

use crate::error::CompletionError;
use crate::grammar::{ArgTokens, Choice, ChoiceSource, CompletionRequest, SchemaLoader};

/// Schema loader with the built-in providers registered
pub fn default_loader() -> SchemaLoader {
    let mut loader = SchemaLoader::new();
    loader
        .register("env_vars", ChoiceSource::provider(env_var_names))
        .register("paths", ChoiceSource::completer(complete_path));
    loader
}

/// Names of the current environment variables, sorted
fn env_var_names(_: Option<&ArgTokens>) -> Result<Vec<Choice>, CompletionError> {
    let mut names: Vec<String> = std::env::vars_os()
        .filter_map(|(key, _)| key.into_string().ok())
        .collect();
    names.sort();
    Ok(names.into_iter().map(Choice::new).collect())
}

/// Files and directories whose path starts with the fragment
fn complete_path(
    request: &CompletionRequest<'_>,
    _: Option<&ArgTokens>,
) -> Result<Vec<Choice>, CompletionError> {
    complete_path_in(Path::new("."), request.text)
}

/// Path completion relative to `base`.
///
/// Directories get a trailing separator so the next tab descends into them.
pub fn complete_path_in(base: &Path, text: &str) -> Result<Vec<Choice>, CompletionError> {
    let (dir_part, file_prefix) = match text.rfind(MAIN_SEPARATOR) {
        Some(index) => text.split_at(index + 1),
        None => ("", text),
    };
    let dir = if dir_part.is_empty() {
        base.to_path_buf()
    } else if Path::new(dir_part).is_absolute() {
        Path::new(dir_part).to_path_buf()
    } else {
        base.join(dir_part)
    };

    let entries = fs::read_dir(&dir)
        .map_err(|e| CompletionError::new(format!("cannot read {}: {e}", dir.display())))?;

    let mut matches = Vec::new();
    for entry in entries.flatten() {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !name.starts_with(file_prefix) || (name.starts_with('.') && !file_prefix.starts_with('.')) {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let suffix = if is_dir { MAIN_SEPARATOR.to_string() } else { String::new() };
        matches.push(format!("{dir_part}{name}{suffix}"));
    }
    matches.sort();
    Ok(matches.into_iter().map(Choice::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn values(choices: Vec<Choice>) -> Vec<String> {
        choices.iter().map(|c| c.value.to_string()).collect()
    }

    #[test]
    fn test_complete_path_in() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("songs")).unwrap();
        fs::write(dir.path().join("setlist.txt"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        fs::write(dir.path().join("songs").join("intro.flac"), "").unwrap();

        let sep = MAIN_SEPARATOR;
        assert_eq!(
            values(complete_path_in(dir.path(), "s").unwrap()),
            vec!["setlist.txt".to_string(), format!("songs{sep}")]
        );
        assert_eq!(
            values(complete_path_in(dir.path(), &format!("songs{sep}i")).unwrap()),
            vec![format!("songs{sep}intro.flac")]
        );
        assert_eq!(
            values(complete_path_in(dir.path(), ".h").unwrap()),
            vec![".hidden".to_string()]
        );
    }

    #[test]
    fn test_complete_path_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let err = complete_path_in(dir.path(), "nope/x").unwrap_err();
        assert!(err.message().starts_with("cannot read"));
    }

    #[test]
    fn test_default_loader_builds_demo_schema() {
        let grammars = default_loader().parse(super::super::DEMO_SCHEMA).unwrap();
        let names: Vec<_> = grammars.iter().map(|g| g.prog().to_string()).collect();
        assert_eq!(names, vec!["music", "env", "copy", "run"]);
    }
}
