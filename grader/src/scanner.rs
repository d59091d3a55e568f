//! Source-file discovery over an acquired workspace.
//!
//! Walks the checkout with an explicit worklist (no recursion, so adversarial
//! directory depth cannot exhaust the stack), skipping dependency caches,
//! version-control metadata, build output and interpreter caches outright.
//! Directory entries are visited in name order so repeated scans of an
//! unmodified workspace yield a byte-identical corpus.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

/// Directory names that are never descended into.
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "dist",
    "build",
    "out",
    "target",
    "__pycache__",
    ".venv",
    "venv",
    "vendor",
    "coverage",
    ".next",
    ".idea",
    ".vscode",
];

/// File extensions considered gradable source code.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "py", "java", "c", "h", "cpp", "hpp", "cc", "cs",
    "go", "rs", "rb", "php", "swift", "kt", "scala", "html", "css", "scss", "sql", "sh",
];

/// One selected file: its path relative to the workspace root and its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative_path: String,
    pub content: String,
}

fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

fn has_allowed_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

/// Collect all gradable files under `root`, in deterministic traversal order.
///
/// The traversal is breadth-first over a queue of pending directories with
/// entries sorted by file name, so the output ordering depends only on the
/// tree itself. Symlinks are not followed.
pub fn scan(root: &Path) -> io::Result<Vec<FileRecord>> {
    let mut selected = Vec::new();
    let mut pending: VecDeque<std::path::PathBuf> = VecDeque::from([root.to_path_buf()]);

    while let Some(dir) = pending.pop_front() {
        let mut entries: Vec<fs::DirEntry> = fs::read_dir(&dir)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                if !is_excluded_dir(&name) {
                    pending.push_back(entry.path());
                }
            } else if file_type.is_file() && has_allowed_extension(&name) {
                let path = entry.path();
                let bytes = fs::read(&path)?;
                let relative_path = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .into_owned();
                selected.push(FileRecord {
                    relative_path,
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
        }
    }

    Ok(selected)
}

/// Concatenate selected files into the corpus handed to the scoring service.
/// Each file's content is preceded by a marker line naming its path relative
/// to the workspace root.
pub fn concatenate(files: &[FileRecord]) -> String {
    let mut corpus = String::new();
    for file in files {
        corpus.push_str(&format!("==== FILE: {} ====\n", file.relative_path));
        corpus.push_str(&file.content);
        if !file.content.ends_with('\n') {
            corpus.push('\n');
        }
        corpus.push('\n');
    }
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn selects_only_allowed_extensions_outside_excluded_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        write(root, "index.js", "console.log('hi');");
        write(root, "src/app.py", "print('hi')");
        write(root, "README.md", "# readme");
        write(root, "notes.txt", "notes");
        write(root, "node_modules/lodash/lodash.js", "module.exports = {};");
        write(root, ".git/config", "[core]");
        write(root, "build/out.js", "bundled");
        write(root, "src/__pycache__/app.cpython-311.pyc", "bytecode");

        let files = scan(root).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();

        assert_eq!(paths, vec!["index.js", "src/app.py"]);
    }

    #[test]
    fn traversal_order_is_deterministic() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        write(root, "b.js", "b");
        write(root, "a.js", "a");
        write(root, "lib/z.js", "z");
        write(root, "lib/y.js", "y");
        write(root, "app/m.js", "m");

        let first = scan(root).unwrap();
        let second = scan(root).unwrap();
        assert_eq!(first, second);

        let paths: Vec<&str> = first.iter().map(|f| f.relative_path.as_str()).collect();
        // top-level files in name order, then subdirectories in name order
        assert_eq!(paths, vec!["a.js", "b.js", "app/m.js", "lib/y.js", "lib/z.js"]);
    }

    #[test]
    fn concatenation_prefixes_each_file_with_a_marker_line() {
        let files = vec![
            FileRecord {
                relative_path: "a.js".into(),
                content: "let a = 1;\n".into(),
            },
            FileRecord {
                relative_path: "lib/b.js".into(),
                content: "let b = 2;".into(),
            },
        ];

        let corpus = concatenate(&files);
        assert!(corpus.starts_with("==== FILE: a.js ====\nlet a = 1;\n"));
        assert!(corpus.contains("==== FILE: lib/b.js ====\nlet b = 2;\n"));
    }

    #[test]
    fn dotfiles_without_real_extensions_are_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        write(root, ".gitignore", "node_modules/");
        write(root, ".env.sh", "export X=1");

        let files = scan(root).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        // ".gitignore" has no stem+extension split; ".env.sh" does
        assert_eq!(paths, vec![".env.sh"]);
    }

    #[test]
    fn empty_workspace_selects_nothing() {
        let dir = tempdir().unwrap();
        assert!(scan(dir.path()).unwrap().is_empty());
    }
}
