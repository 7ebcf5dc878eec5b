//! Loading commit facts from disk.
//!
//! Accepted inputs:
//! - a `.json` file holding one fact object or an array of them,
//! - a `.jsonl` file with one fact per line (blank lines ignored),
//! - a directory, walked recursively; every `.json`/`.jsonl` file inside is
//!   read in file-name order. Hidden directories are skipped.

use std::path::Path;

use walkdir::WalkDir;

use crate::config::CommitFact;
use crate::error::{HyphaeError, Result};

pub fn read_commit_facts(path: &Path) -> Result<Vec<CommitFact>> {
    if path.is_dir() {
        return read_dir(path);
    }
    match extension(path) {
        Some("jsonl") => read_jsonl(path),
        Some("json") => read_json(path),
        _ => Err(HyphaeError::invalid(format!(
            "unsupported input {}: expected a .json or .jsonl file or a directory",
            path.display()
        ))),
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| HyphaeError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_json(path: &Path) -> Result<Vec<CommitFact>> {
    let text = read_text(path)?;
    let location = path.display().to_string();
    let parsed = if text.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<CommitFact>>(&text)
    } else {
        serde_json::from_str::<CommitFact>(&text).map(|fact| vec![fact])
    };
    parsed.map_err(|source| HyphaeError::Json { location, source })
}

fn read_jsonl(path: &Path) -> Result<Vec<CommitFact>> {
    let text = read_text(path)?;
    let mut facts = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fact = serde_json::from_str(line).map_err(|source| HyphaeError::Json {
            location: format!("{}:{}", path.display(), i + 1),
            source,
        })?;
        facts.push(fact);
    }
    Ok(facts)
}

fn read_dir(root: &Path) -> Result<Vec<CommitFact>> {
    let mut facts = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.depth() > 0 && e.file_type().is_dir() && e.file_name().to_string_lossy().starts_with('.'))
        });
    for entry in walker {
        let entry = entry.map_err(|e| HyphaeError::Io {
            path: e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| root.display().to_string()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match extension(entry.path()) {
            Some("json") => facts.extend(read_json(entry.path())?),
            Some("jsonl") => facts.extend(read_jsonl(entry.path())?),
            _ => log::debug!("skipping non-fact file {}", entry.path().display()),
        }
    }
    if facts.is_empty() {
        log::warn!("no commit facts found under {}", root.display());
    }
    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FACT: &str = r#"{"hash":"c1","timestamp":"2024-01-01T00:00:00Z","author":{"handle":"alice"},"changes":[{"path":"a.py","type":"ADDED"}],"repository_name":"acme/widgets"}"#;

    #[test]
    fn reads_single_object_and_array() {
        let dir = tempfile::tempdir().unwrap();
        let single = dir.path().join("one.json");
        fs::write(&single, FACT).unwrap();
        assert_eq!(read_commit_facts(&single).unwrap().len(), 1);

        let array = dir.path().join("many.json");
        fs::write(&array, format!("[{FACT},{}]", FACT.replace("c1", "c2"))).unwrap();
        let facts = read_commit_facts(&array).unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[1].hash, "c2");
    }

    #[test]
    fn jsonl_reports_line_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.jsonl");
        fs::write(&path, format!("{FACT}\n\n{{broken\n")).unwrap();
        let err = read_commit_facts(&path).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert!(err.to_string().contains("facts.jsonl:3"), "{err}");
    }

    #[test]
    fn directory_is_read_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jsonl"), FACT.replace("c1", "c2")).unwrap();
        fs::write(dir.path().join("a.json"), FACT).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/x.json"), "not json").unwrap();

        let hashes: Vec<_> = read_commit_facts(dir.path())
            .unwrap()
            .into_iter()
            .map(|f| f.hash)
            .collect();
        assert_eq!(hashes, vec!["c1", "c2"]);
    }

    #[test]
    fn unsupported_extension_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.csv");
        fs::write(&path, "").unwrap();
        assert_eq!(read_commit_facts(&path).unwrap_err().kind(), "invalid_argument");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_commit_facts(Path::new("/nonexistent/facts.json")).unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
