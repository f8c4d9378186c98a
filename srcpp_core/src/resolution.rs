use std::collections::BTreeMap;
use std::fmt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use snailquote::unescape;

/// Field holding the canonical identity of a resolved reference.
pub const KEY_FIELD: &str = "key";
/// Field holding the file path of a resolved reference.
pub const PATH_FIELD: &str = "path";

/// Outcome of resolving one raw reference. A failed result carries no key and
/// must never be enqueued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
	fields: BTreeMap<String, String>,
	success: bool,
}

impl ResolutionResult {
	/// A failed resolution with no fields.
	pub fn failed() -> Self {
		Self::default()
	}

	/// A successful resolution with the given key and path. Only the key is
	/// rendered with forward slashes; the path is stored as is.
	pub fn resolved(key: impl Into<String>, path: &Path) -> Self {
		let mut result = Self::default();
		result.set_value(KEY_FIELD, key);
		result.set_value(PATH_FIELD, path.to_string_lossy());
		result.success = true;
		result
	}

	pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.fields.insert(name.into(), value.into());
	}

	pub fn value(&self, name: &str) -> Option<&str> {
		self.fields.get(name).map(String::as_str)
	}

	pub fn fields(&self) -> &BTreeMap<String, String> {
		&self.fields
	}

	pub fn is_success(&self) -> bool {
		self.success
	}

	/// The canonical key, present only when resolution succeeded.
	pub fn key(&self) -> Option<&str> {
		if self.success {
			self.value(KEY_FIELD)
		} else {
			None
		}
	}

	/// The resolved file path, present only when resolution succeeded.
	pub fn path(&self) -> Option<PathBuf> {
		if self.success {
			self.value(PATH_FIELD).map(PathBuf::from)
		} else {
			None
		}
	}
}

type ResolveFn = dyn Fn(&[String], &Path) -> ResolutionResult;

/// A strategy turning raw reference tokens plus the directory of the
/// referencing file into a [`ResolutionResult`].
///
/// The default scheme keys every file by its normalized absolute path. Other
/// schemes may derive several keys for one physical file so the same file can
/// be materialized more than once.
pub struct ResolutionScheme {
	name: String,
	resolve: Box<ResolveFn>,
}

impl ResolutionScheme {
	pub fn new(
		name: impl Into<String>,
		resolve: impl Fn(&[String], &Path) -> ResolutionResult + 'static,
	) -> Self {
		Self {
			name: name.into(),
			resolve: Box::new(resolve),
		}
	}

	/// Key and path are both the normalized absolute path of the first token.
	pub fn path_key() -> Self {
		Self::new("path_key", resolve_path_key)
	}

	/// Like [`ResolutionScheme::path_key`], but any tokens after the first are
	/// appended to the key as parameters: `/src/a.cl?WIDTH=4,HEIGHT=2`. The
	/// path is left untouched.
	pub fn parameterized() -> Self {
		Self::new("parameterized", resolve_parameterized)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn resolve(&self, tokens: &[String], current_dir: &Path) -> ResolutionResult {
		(self.resolve)(tokens, current_dir)
	}
}

impl Default for ResolutionScheme {
	fn default() -> Self {
		Self::path_key()
	}
}

impl fmt::Debug for ResolutionScheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResolutionScheme")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

fn resolve_path_key(tokens: &[String], current_dir: &Path) -> ResolutionResult {
	let Some(reference) = tokens.first().and_then(|token| unquote_token(token)) else {
		return ResolutionResult::failed();
	};

	let path = normalize_path(&current_dir.join(reference));
	ResolutionResult::resolved(path_key(&path), &path)
}

fn resolve_parameterized(tokens: &[String], current_dir: &Path) -> ResolutionResult {
	let mut result = resolve_path_key(tokens, current_dir);
	let Some(base_key) = result.key().map(str::to_string) else {
		return result;
	};

	let mut parameters = Vec::with_capacity(tokens.len().saturating_sub(1));
	for token in &tokens[1..] {
		let Some(parameter) = unquote_token(token) else {
			return ResolutionResult::failed();
		};
		parameters.push(parameter);
	}

	if !parameters.is_empty() {
		result.set_value(KEY_FIELD, format!("{base_key}?{}", parameters.join(",")));
	}

	result
}

/// Trim a reference token and strip surrounding quotes. Returns `None` when
/// nothing usable is left.
pub(crate) fn unquote_token(token: &str) -> Option<String> {
	let trimmed = token.trim();
	let value = if trimmed.starts_with('"') || trimmed.starts_with('\'') {
		unescape(trimmed).ok()?
	} else {
		trimmed.to_string()
	};

	if value.is_empty() { None } else { Some(value) }
}

/// Make `path` absolute and fold `.` and `..` components without touching the
/// filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
	let absolute = if path.is_absolute() {
		path.to_path_buf()
	} else {
		std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
	};

	let mut normalized = PathBuf::new();
	for component in absolute.components() {
		match component {
			Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
				normalized.push(component);
			}
			Component::CurDir => {}
			Component::ParentDir => {
				normalized.pop();
			}
		}
	}

	normalized
}

/// Render a path as a key string with forward slashes on every platform.
pub fn path_key(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}
