use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Definitions;
use crate::Settings;
use crate::SrcppError;
use crate::SrcppResult;
use crate::plugins::DEFAULT_CHAIN;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["srcpp.toml", ".srcpp.toml", ".config/srcpp.toml"];

/// A scalar setting value. TOML booleans and integers are accepted for
/// convenience and handed to plugins in their string form.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum SettingValue {
	String(String),
	Boolean(bool),
	Integer(i64),
}

impl fmt::Display for SettingValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::String(value) => f.write_str(value),
			Self::Boolean(value) => write!(f, "{value}"),
			Self::Integer(value) => write!(f, "{value}"),
		}
	}
}

/// Configuration loaded from an `srcpp.toml` file.
///
/// ```toml
/// inputs = ["kernels/main.cl"]
/// separator = "\n"
/// chain = ["inc", "blr"]
/// definitions = ["DEBUG"]
///
/// [settings.blr]
/// set-removekeyword = "###BLANK###"
/// ss = "onfinishup"
///
/// [settings.inc]
/// kw = "#import"
/// ```
#[derive(Debug, Deserialize)]
pub struct SrcppConfig {
	/// Files to preprocess, relative to the project root. Used when no inputs
	/// are given on the command line.
	#[serde(default)]
	pub inputs: Vec<PathBuf>,
	/// Separator recorded on seed scripts.
	#[serde(default = "default_separator")]
	pub separator: String,
	/// Plugin prefixes in chain order. Defaults to [`DEFAULT_CHAIN`].
	#[serde(default)]
	pub chain: Option<Vec<String>>,
	/// Names defined before the run starts.
	#[serde(default)]
	pub definitions: Vec<String>,
	/// Plugin settings keyed by plugin prefix, then option name or shortcut.
	#[serde(default)]
	pub settings: BTreeMap<String, BTreeMap<String, SettingValue>>,
}

impl Default for SrcppConfig {
	fn default() -> Self {
		Self {
			inputs: Vec::new(),
			separator: default_separator(),
			chain: None,
			definitions: Vec::new(),
			settings: BTreeMap::new(),
		}
	}
}

fn default_separator() -> String {
	"\n".to_string()
}

impl SrcppConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> SrcppResult<Option<SrcppConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	pub fn parse(content: &str) -> SrcppResult<SrcppConfig> {
		toml::from_str(content).map_err(|e| SrcppError::ConfigParse(e.to_string()))
	}

	/// The configured chain, or the default chain.
	pub fn chain(&self) -> Vec<String> {
		self.chain.clone().unwrap_or_else(|| {
			DEFAULT_CHAIN
				.iter()
				.map(|prefix| (*prefix).to_string())
				.collect()
		})
	}

	pub fn settings(&self) -> Settings {
		let mut settings = Settings::new();
		for (prefix, options) in &self.settings {
			for (option, value) in options {
				settings.set(prefix, option, value.to_string());
			}
		}
		settings
	}

	pub fn definitions(&self) -> Definitions {
		self.definitions.iter().cloned().collect()
	}

	/// Inputs resolved against `root`.
	pub fn inputs(&self, root: &Path) -> Vec<PathBuf> {
		self.inputs.iter().map(|input| root.join(input)).collect()
	}
}
