use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobMatcher;
use ignore::WalkBuilder;

use crate::SrcppError;
use crate::SrcppResult;

/// Filesystem access used by the preprocessor. Every read the engine performs
/// goes through this trait, so scripts can come from disk, from memory, or
/// from any other content source a host wants to plug in.
pub trait FileSystem {
	/// Returns true when `path` names a readable file.
	fn file_exists(&self, path: &Path) -> bool;

	/// Read the file at `path` and split it into lines. Line endings are
	/// normalized, so `\r\n` and `\r` both end a line.
	fn read_all_lines(&self, path: &Path) -> SrcppResult<Vec<String>>;

	/// Recursively list files below `directory` whose file name matches the
	/// glob `pattern`. Results are sorted. A missing directory lists nothing.
	fn list_files(&self, directory: &Path, pattern: &str) -> SrcppResult<Vec<PathBuf>>;
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
	fn file_exists(&self, path: &Path) -> bool {
		path.is_file()
	}

	fn read_all_lines(&self, path: &Path) -> SrcppResult<Vec<String>> {
		let content = std::fs::read_to_string(path)?;
		Ok(split_lines(&content))
	}

	fn list_files(&self, directory: &Path, pattern: &str) -> SrcppResult<Vec<PathBuf>> {
		let matcher = file_name_matcher(pattern)?;
		let mut files = Vec::new();
		if !directory.is_dir() {
			return Ok(files);
		}

		// Hidden files and ignore files are part of the source tree here, not
		// noise to be filtered.
		let walker = WalkBuilder::new(directory)
			.standard_filters(false)
			.follow_links(false)
			.build();

		for entry in walker {
			let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
			let is_file = entry.file_type().is_some_and(|kind| kind.is_file());
			if is_file && matches_file_name(&matcher, entry.path()) {
				files.push(entry.into_path());
			}
		}

		files.sort();
		Ok(files)
	}
}

/// [`FileSystem`] holding its files in memory. Paths are stored exactly as
/// given, so callers should insert absolute, normalized paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
	files: BTreeMap<PathBuf, String>,
}

impl MemoryFileSystem {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add or replace a file.
	pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
		self.files.insert(path.into(), content.into());
	}

	/// Builder-style variant of [`MemoryFileSystem::insert`].
	#[must_use]
	pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
		self.insert(path, content);
		self
	}
}

impl FileSystem for MemoryFileSystem {
	fn file_exists(&self, path: &Path) -> bool {
		self.files.contains_key(path)
	}

	fn read_all_lines(&self, path: &Path) -> SrcppResult<Vec<String>> {
		let Some(content) = self.files.get(path) else {
			return Err(SrcppError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("no in-memory file at `{}`", path.display()),
			)));
		};

		Ok(split_lines(content))
	}

	fn list_files(&self, directory: &Path, pattern: &str) -> SrcppResult<Vec<PathBuf>> {
		let matcher = file_name_matcher(pattern)?;

		// BTreeMap keys are already sorted.
		Ok(self
			.files
			.keys()
			.filter(|path| path.starts_with(directory) && matches_file_name(&matcher, path))
			.cloned()
			.collect())
	}
}

/// Split text into lines the way the preprocessor sees them. A trailing line
/// ending does not produce an extra empty line.
pub fn split_lines(content: &str) -> Vec<String> {
	let normalized = normalize_line_endings(content);
	normalized.lines().map(str::to_string).collect()
}

/// Normalize CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

fn file_name_matcher(pattern: &str) -> SrcppResult<GlobMatcher> {
	Glob::new(pattern)
		.map(|glob| glob.compile_matcher())
		.map_err(|e| {
			SrcppError::InvalidPattern {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			}
		})
}

fn matches_file_name(matcher: &GlobMatcher, path: &Path) -> bool {
	path.file_name().is_some_and(|name| matcher.is_match(name))
}
