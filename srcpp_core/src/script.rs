use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use serde::Serialize;

use crate::ResolutionResult;

/// Canonical identity of one tracked file-reference instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, Serialize)]
#[serde(transparent)]
pub struct ScriptKey(String);

impl ScriptKey {
	pub fn new(key: impl Into<String>) -> Self {
		Self(key.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ScriptKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ScriptKey {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// One loaded file. The raw lines are fixed at creation; plugins produce
/// derived output instead of editing the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceScript {
	key: ScriptKey,
	path: PathBuf,
	raw_lines: Vec<String>,
	resolution: ResolutionResult,
	separator: String,
}

impl SourceScript {
	/// Build a script from a successful resolution. Only the source manager's
	/// factory calls this, so creation stays behind the creation lock.
	pub(crate) fn from_resolution(
		separator: &str,
		raw_lines: Vec<String>,
		resolution: ResolutionResult,
	) -> Option<Self> {
		let key = ScriptKey::new(resolution.key()?);
		let path = resolution.path()?;

		Some(Self {
			key,
			path,
			raw_lines,
			resolution,
			separator: separator.to_string(),
		})
	}

	pub fn key(&self) -> &ScriptKey {
		&self.key
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Directory containing the script, used as the base for references made
	/// from inside it.
	pub fn directory(&self) -> &Path {
		self.path.parent().unwrap_or_else(|| Path::new(""))
	}

	/// File name for log output. Falls back to the full key.
	pub fn display_name(&self) -> &str {
		self.path
			.file_name()
			.and_then(|name| name.to_str())
			.unwrap_or(self.key.as_str())
	}

	pub fn raw_lines(&self) -> &[String] {
		&self.raw_lines
	}

	pub fn resolution(&self) -> &ResolutionResult {
		&self.resolution
	}

	pub fn separator(&self) -> &str {
		&self.separator
	}

	/// The raw lines joined with the script's separator.
	pub fn content(&self) -> String {
		self.raw_lines.join(&self.separator)
	}
}
