use crate::constants::DEFAULT_EXTENSIONS;
use crate::error::Result;
use glob::glob;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Case-insensitive set of recognized file extensions, stored lowercase
/// without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet(BTreeSet<String>);

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.0.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// Lists candidate image files under `input`, sorted lexicographically.
///
/// `input` may be a single file, a directory, or (when it does not exist on
/// disk) a glob pattern. Directories are listed one level deep unless
/// `recursive` is set; hidden entries are skipped.
///
/// # Errors
/// * `BenchError::Io` if the root does not exist or cannot be listed
///
/// Unreadable entries below the root are skipped, not reported as errors.
pub fn collect_image_files(
    input: &str,
    extensions: &ExtensionSet,
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    let input_path = Path::new(input);

    let mut image_files = if input_path.is_file() {
        if extensions.matches(input_path) {
            vec![input_path.to_path_buf()]
        } else {
            crate::warn!(
                "{:?} does not have a recognized image extension, skipping",
                input_path
            );
            Vec::new()
        }
    } else if input_path.is_dir() {
        collect_from_directory(input_path, extensions, recursive)?
    } else if is_glob_pattern(input) {
        collect_from_glob(input, extensions)?
    } else {
        let err = fs::metadata(input_path).err().unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is neither a file nor a directory", input),
            )
        });
        return Err(err.into());
    };

    image_files.sort();
    Ok(image_files)
}

fn collect_from_directory(
    root: &Path,
    extensions: &ExtensionSet,
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    // Surface an unlistable root as an error before walking
    fs::read_dir(root)?;

    let walker = if recursive {
        WalkDir::new(root).min_depth(1)
    } else {
        WalkDir::new(root).min_depth(1).max_depth(1)
    };

    let mut image_files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                crate::verbose!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() && extensions.matches(path) {
            image_files.push(path.to_path_buf());
        }
    }

    Ok(image_files)
}

fn collect_from_glob(pattern: &str, extensions: &ExtensionSet) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    for entry in glob(pattern)? {
        match entry {
            Ok(path) if path.is_file() && extensions.matches(&path) => image_files.push(path),
            Ok(_) => {}
            Err(e) => crate::verbose!("Skipping unreadable entry: {}", e),
        }
    }
    Ok(image_files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
