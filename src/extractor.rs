//! Docstring extraction from Python source trees.
//!
//! Walks a working copy for `*.py` files, parses each with tree-sitter,
//! and yields one [`DocRecord`] per documented module, class, and
//! function. A documentation string is the first statement of a body when
//! that statement is a plain string literal; anything else yields nothing.
//!
//! Traversal is a depth-first walk in source order, so records for a file
//! are emitted deterministically top-to-bottom.

use anyhow::{anyhow, bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};
use walkdir::WalkDir;

use crate::models::{DocKind, DocRecord};

/// Per-file context carried into every record extracted from that file.
#[derive(Debug, Clone)]
pub struct FileMeta<'a> {
    pub project_name: Option<&'a str>,
    /// Path relative to the clone directory (collection root).
    pub file_path: Option<&'a str>,
    pub source_url: Option<&'a str>,
    /// `object_name` for the module record when no project name is set;
    /// conventionally the file's base name.
    pub module_fallback: &'a str,
}

/// Enumerate source files under `root` matching the include globs, minus
/// the exclude globs. Results are sorted by path for determinism.
pub fn scan_files(root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let include_set = build_globset(include)?;

    let mut default_excludes = vec!["**/.git/**".to_string()];
    default_excludes.extend(exclude.iter().cloned());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Extract all docstring records from one file.
///
/// Read failures and syntax errors are returned as errors; the harvest
/// loop counts one extraction error per failed file and moves on.
pub fn extract_file(path: &Path, meta: &FileMeta) -> Result<Vec<DocRecord>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))?;
    extract_source(&source, meta)
}

/// Extract all docstring records from Python source text.
pub fn extract_source(source: &str, meta: &FileMeta) -> Result<Vec<DocRecord>> {
    let mut parser = python_parser()?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow!("parser produced no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        bail!("source is not valid Python");
    }

    let mut records = Vec::new();
    collect(root, source, meta, &mut records);
    Ok(records)
}

fn python_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| anyhow!("Failed to load Python grammar: {}", e))?;
    Ok(parser)
}

/// Depth-first, source-order walk emitting a record per documented node.
fn collect(node: Node, source: &str, meta: &FileMeta, out: &mut Vec<DocRecord>) {
    if let Some(kind) = classify(&node) {
        if let Some(content) = node_docstring(&node, source, kind) {
            out.push(DocRecord {
                content,
                source_url: meta.source_url.map(str::to_string),
                project_name: meta.project_name.map(str::to_string),
                file_path: meta.file_path.map(str::to_string),
                doc_type: kind,
                object_name: object_name(&node, source, kind, meta),
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect(child, source, meta, out);
    }
}

/// Tagged classification of parse-tree nodes. Async functions parse to
/// the same `function_definition` kind as synchronous ones.
fn classify(node: &Node) -> Option<DocKind> {
    match node.kind() {
        "module" => Some(DocKind::Module),
        "class_definition" => Some(DocKind::Class),
        "function_definition" => Some(DocKind::Function),
        _ => None,
    }
}

fn object_name(node: &Node, source: &str, kind: DocKind, meta: &FileMeta) -> Option<String> {
    match kind {
        DocKind::Module => Some(
            meta.project_name
                .filter(|name| !name.is_empty())
                .unwrap_or(meta.module_fallback)
                .to_string(),
        ),
        DocKind::Class | DocKind::Function => node
            .child_by_field_name("name")
            .and_then(|name| name.utf8_text(source.as_bytes()).ok())
            .map(str::to_string),
    }
}

/// The docstring attached to a node: its body's first statement, when
/// that statement is a plain string literal. Trimmed; whitespace-only
/// strings yield `None`.
fn node_docstring(node: &Node, source: &str, kind: DocKind) -> Option<String> {
    let body = match kind {
        // The module node is its own body.
        DocKind::Module => *node,
        DocKind::Class | DocKind::Function => node.child_by_field_name("body")?,
    };

    // Leading comments do not displace a docstring.
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;

    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }

    let content = string_literal_content(&expr, source)?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Content of a plain string literal, without quotes or prefixes.
///
/// f-strings and bytes literals are not documentation strings and yield
/// `None`.
fn string_literal_content(string_node: &Node, source: &str) -> Option<String> {
    let mut content = String::new();

    let mut cursor = string_node.walk();
    for child in string_node.children(&mut cursor) {
        match child.kind() {
            "string_start" => {
                let start = child.utf8_text(source.as_bytes()).ok()?;
                let prefix = start.trim_end_matches(['"', '\'']);
                if prefix
                    .chars()
                    .any(|c| matches!(c, 'f' | 'F' | 'b' | 'B'))
                {
                    return None;
                }
            }
            "interpolation" => return None,
            "string_content" => {
                content.push_str(child.utf8_text(source.as_bytes()).ok()?);
            }
            _ => {}
        }
    }

    Some(content)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> FileMeta<'static> {
        FileMeta {
            project_name: Some("widget"),
            file_path: Some("widget/src/api.py"),
            source_url: Some("https://github.com/acme/widget/blob/abc123/src/api.py"),
            module_fallback: "api.py",
        }
    }

    fn extract(source: &str) -> Vec<DocRecord> {
        extract_source(source, &meta()).unwrap()
    }

    #[test]
    fn module_docstring_produces_one_module_record() {
        let records = extract("\"\"\"Widget API.\"\"\"\n\nx = 1\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].doc_type, DocKind::Module);
        assert_eq!(records[0].content, "Widget API.");
        assert_eq!(records[0].object_name.as_deref(), Some("widget"));
        assert_eq!(records[0].file_path.as_deref(), Some("widget/src/api.py"));
    }

    #[test]
    fn module_record_falls_back_to_file_name_without_project() {
        let no_project = FileMeta {
            project_name: None,
            file_path: None,
            source_url: None,
            module_fallback: "api.py",
        };
        let records = extract_source("\"\"\"Docs.\"\"\"\n", &no_project).unwrap();
        assert_eq!(records[0].object_name.as_deref(), Some("api.py"));
    }

    #[test]
    fn documented_function_uses_declared_name() {
        let records = extract("def fetch(url):\n    \"\"\"Fetch a URL.\"\"\"\n    return url\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].doc_type, DocKind::Function);
        assert_eq!(records[0].object_name.as_deref(), Some("fetch"));
        assert_eq!(records[0].content, "Fetch a URL.");
    }

    #[test]
    fn documented_class_and_method() {
        let source = r#"
class Session:
    """Holds connection state."""

    def close(self):
        """Release the connection."""
        pass
"#;
        let records = extract(source);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].doc_type, DocKind::Class);
        assert_eq!(records[0].object_name.as_deref(), Some("Session"));
        assert_eq!(records[1].doc_type, DocKind::Function);
        assert_eq!(records[1].object_name.as_deref(), Some("close"));
    }

    #[test]
    fn async_and_nested_functions_are_covered() {
        let source = r#"
async def poll():
    """Poll the queue."""

    def inner():
        """Nested helper."""
        pass
"#;
        let records = extract(source);
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.doc_type == DocKind::Function));
        let names: Vec<_> = records
            .iter()
            .filter_map(|r| r.object_name.as_deref())
            .collect();
        assert_eq!(names, vec!["poll", "inner"]);
    }

    #[test]
    fn decorated_definitions_are_still_visited() {
        let source = r#"
@cached
def lookup(key):
    """Resolve a key."""
    return key
"#;
        let records = extract(source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].object_name.as_deref(), Some("lookup"));
    }

    #[test]
    fn whitespace_only_docstring_yields_nothing() {
        let records = extract("def f():\n    \"   \"\n    pass\n");
        assert!(records.is_empty());
    }

    #[test]
    fn undocumented_definitions_yield_nothing() {
        let records = extract("def f():\n    return 1\n\nclass C:\n    pass\n");
        assert!(records.is_empty());
    }

    #[test]
    fn non_string_first_statement_is_not_a_docstring() {
        let records = extract("def f():\n    x = \"not a docstring\"\n    return x\n");
        assert!(records.is_empty());
    }

    #[test]
    fn f_string_is_not_a_docstring() {
        let records = extract("def f(name):\n    f\"\"\"Hello {name}.\"\"\"\n    pass\n");
        assert!(records.is_empty());
    }

    #[test]
    fn leading_comment_does_not_displace_module_docstring() {
        let records = extract("# encoding note\n\"\"\"Module docs.\"\"\"\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].doc_type, DocKind::Module);
    }

    #[test]
    fn records_come_out_in_source_order() {
        let source = r#""""Top."""

def first():
    """One."""

def second():
    """Two."""
"#;
        let contents: Vec<_> = extract(source).into_iter().map(|r| r.content).collect();
        assert_eq!(contents, vec!["Top.", "One.", "Two."]);
    }

    #[test]
    fn syntax_error_is_reported_as_error() {
        let result = extract_source("def broken(:\n    pass\n", &meta());
        assert!(result.is_err());
    }

    #[test]
    fn empty_file_yields_nothing() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn docstring_content_is_trimmed() {
        let records = extract("\"\"\"\n    Indented summary.\n\"\"\"\n");
        assert_eq!(records[0].content, "Indented summary.");
    }

    #[test]
    fn scan_files_filters_and_sorts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("pkg")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("pkg/b.py"), "").unwrap();
        std::fs::write(root.join("a.py"), "").unwrap();
        std::fs::write(root.join("README.md"), "").unwrap();
        std::fs::write(root.join(".git/config.py"), "").unwrap();

        let files = scan_files(root, &["**/*.py".to_string()], &[]).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(rel, vec!["a.py".to_string(), "pkg/b.py".to_string()]);
    }

    #[test]
    fn scan_files_honors_exclude_globs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("tests")).unwrap();
        std::fs::write(root.join("keep.py"), "").unwrap();
        std::fs::write(root.join("tests/skip.py"), "").unwrap();

        let files = scan_files(
            root,
            &["**/*.py".to_string()],
            &["tests/**".to_string()],
        )
        .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.py"));
    }
}
