//! Reading post texts handed over by the crawler

use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::types::PostText;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
}

/// On-disk layout of a post dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One `{"url": ..., "text": ...}` object per line
    Jsonl,
    /// Plain text, posts separated by blank lines
    Text,
}

impl InputFormat {
    /// Guess the format from a file extension (`.jsonl`/`.json` → JSONL)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("json") => {
                Self::Jsonl
            }
            _ => Self::Text,
        }
    }
}

/// Parse JSON lines. Blank lines are skipped; a malformed line fails the
/// whole input with its 1-based line number.
pub fn parse_jsonl(content: &str) -> Result<Vec<PostText>, InputError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| InputError::Json { line: i + 1, source })
        })
        .collect()
}

/// Split plain text into posts on blank lines
pub fn parse_text_blocks(content: &str) -> Vec<PostText> {
    let mut posts = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                posts.push(PostText::new(current.join("\n")));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        posts.push(PostText::new(current.join("\n")));
    }

    posts
}

/// Parse `content` in the given format
pub fn parse_posts(content: &str, format: InputFormat) -> Result<Vec<PostText>, InputError> {
    match format {
        InputFormat::Jsonl => parse_jsonl(content),
        InputFormat::Text => Ok(parse_text_blocks(content)),
    }
}

/// Read posts from `path`, or from stdin when `path` is `-`
pub fn read_posts(path: &Path, format: Option<InputFormat>) -> Result<Vec<PostText>, InputError> {
    let format = format.unwrap_or_else(|| InputFormat::from_path(path));

    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| InputError::Read {
                path: "<stdin>".to_string(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.display().to_string(),
            source,
        })?
    };

    parse_posts(&content, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_parse_jsonl() {
        let content = r#"{"url": "https://www.instagram.com/p/abc/", "text": "first"}

{"text": "second\nline"}
"#;
        let posts = parse_jsonl(content).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].url.as_deref(), Some("https://www.instagram.com/p/abc/"));
        assert_eq!(posts[1].text, "second\nline");
    }

    #[test]
    fn test_parse_jsonl_reports_line() {
        let content = "{\"text\": \"ok\"}\n{\"url\": \"x\"}\n";
        match parse_jsonl(content) {
            Err(InputError::Json { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected JSON error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_text_blocks() {
        let content = "post one\nhttps://amzn.to/x\n\n\n  \npost two\n";
        let posts = parse_text_blocks(content);
        assert_eq!(
            posts,
            vec![
                PostText::new("post one\nhttps://amzn.to/x"),
                PostText::new("post two")
            ]
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(InputFormat::from_path(&PathBuf::from("posts.JSONL")), InputFormat::Jsonl);
        assert_eq!(InputFormat::from_path(&PathBuf::from("posts.txt")), InputFormat::Text);
        assert_eq!(InputFormat::from_path(&PathBuf::from("-")), InputFormat::Text);
    }

    #[test]
    fn test_read_posts_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = read_posts(&temp.path().join("missing.jsonl"), None).unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }

    #[test]
    fn test_read_posts_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("posts.jsonl");
        std::fs::write(&path, "{\"text\": \"a\"}\n{\"text\": \"b\"}\n").unwrap();
        let posts = read_posts(&path, None).unwrap();
        assert_eq!(posts.len(), 2);
    }
}
