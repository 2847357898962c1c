//! Filesystem access to cloned repository workspaces.
//!
//! Workspaces live under `{repositories_dir}/{owner}/{repo}/tree`. All
//! client-supplied path components are sanitized or normalized before
//! touching the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

/// Make a single path component safe to join: no separators, no parent
/// traversal.
pub fn sanitize_path_component(component: &str) -> String {
    let sanitized = component
        .replace('/', "_")
        .replace('\\', "_")
        .replace("..", "_")
        .trim()
        .to_string();

    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

/// Root of a repository's checked-out tree on disk.
pub fn repository_path(repositories_dir: &str, owner: &str, repo: &str) -> PathBuf {
    Path::new(repositories_dir)
        .join(sanitize_path_component(owner))
        .join(sanitize_path_component(repo))
        .join("tree")
}

/// Normalize a client-supplied relative path: forward slashes only, no
/// leading or trailing separators, `.` and `..` segments dropped.
pub fn normalize_relative_path(path: Option<&str>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    path.replace('\\', "/")
        .split('/')
        .filter(|p| !p.is_empty() && *p != "." && *p != "..")
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden_entry(name: &str) -> bool {
    name.starts_with('.')
}

/// Indented directory listing, depth-first: directories before files at
/// each level, both alphabetical (case-insensitive), two spaces per
/// level, directories suffixed with `/`. Hidden entries are skipped.
/// Stops once `max_entries` lines have been produced.
pub fn build_directory_tree(
    root: &Path,
    max_depth: usize,
    max_entries: usize,
) -> std::io::Result<Vec<String>> {
    let mut entries = Vec::new();
    traverse_directory(root, 0, max_depth, max_entries, &mut entries, "")?;
    Ok(entries)
}

fn traverse_directory(
    current: &Path,
    depth: usize,
    max_depth: usize,
    max_entries: usize,
    entries: &mut Vec<String>,
    indent: &str,
) -> std::io::Result<()> {
    if entries.len() >= max_entries {
        return Ok(());
    }

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden_entry(&name) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }
    dirs.sort_by_key(|n| n.to_lowercase());
    files.sort_by_key(|n| n.to_lowercase());

    for dir in dirs {
        if entries.len() >= max_entries {
            return Ok(());
        }
        entries.push(format!("{}{}/", indent, dir));
        if depth + 1 < max_depth {
            let child_indent = format!("{}  ", indent);
            traverse_directory(
                &current.join(&dir),
                depth + 1,
                max_depth,
                max_entries,
                entries,
                &child_indent,
            )?;
        }
    }

    for file in files {
        if entries.len() >= max_entries {
            return Ok(());
        }
        entries.push(format!("{}{}", indent, file));
    }

    Ok(())
}

/// Read a window of a file's lines, 1-based, each prefixed with its
/// line number.
pub fn read_file_lines(path: &Path, offset: usize, limit: usize) -> std::io::Result<String> {
    let content = fs::read_to_string(path)?;
    let start = offset.saturating_sub(1);
    let numbered: Vec<String> = content
        .lines()
        .enumerate()
        .skip(start)
        .take(limit)
        .map(|(i, line)| format!("{:>6}: {}", i + 1, line))
        .collect();
    Ok(numbered.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn sanitizes_separators_and_traversal() {
        assert_eq!(sanitize_path_component("acme"), "acme");
        assert_eq!(sanitize_path_component("a/b"), "a_b");
        assert_eq!(sanitize_path_component("a\\b"), "a_b");
        assert_eq!(sanitize_path_component(".."), "_");
        assert_eq!(sanitize_path_component("   "), "_");
        assert_eq!(sanitize_path_component(""), "_");
    }

    #[test]
    fn normalizes_relative_paths() {
        assert_eq!(normalize_relative_path(None), "");
        assert_eq!(normalize_relative_path(Some("src/lib")), "src/lib");
        assert_eq!(normalize_relative_path(Some("/src/lib/")), "src/lib");
        assert_eq!(normalize_relative_path(Some("src\\lib")), "src/lib");
        assert_eq!(normalize_relative_path(Some("../../etc/passwd")), "etc/passwd");
        assert_eq!(normalize_relative_path(Some("./a/./b")), "a/b");
    }

    #[test]
    fn tree_lists_dirs_before_files_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        File::create(dir.path().join("README.md")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        File::create(dir.path().join("src").join("main.rs")).unwrap();

        let entries = build_directory_tree(dir.path(), 3, 200).unwrap();
        assert_eq!(entries, vec!["src/", "  main.rs", "README.md"]);
    }

    #[test]
    fn tree_respects_depth_and_entry_limits() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b").join("c")).unwrap();

        let shallow = build_directory_tree(dir.path(), 1, 200).unwrap();
        assert_eq!(shallow, vec!["a/"]);

        let deep = build_directory_tree(dir.path(), 10, 2).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn reads_numbered_line_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "alpha\nbeta\ngamma\ndelta").unwrap();

        let window = read_file_lines(&path, 2, 2).unwrap();
        assert_eq!(window, format!("{:>6}: beta\n{:>6}: gamma", 2, 3));
    }
}
