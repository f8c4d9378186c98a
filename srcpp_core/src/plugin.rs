use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::Definitions;
use crate::FileSystem;
use crate::OptionInfo;
use crate::Settings;
use crate::SourceManager;
use crate::SourceScript;
use crate::SrcppResult;

/// Where a plugin's line transform runs relative to the full-script
/// transforms of the same phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineOrder {
	/// Ahead of the full-script transforms.
	Before,
	/// Behind the full-script transforms.
	After,
}

impl FromStr for LineOrder {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.to_ascii_lowercase().as_str() {
			"before" => Ok(Self::Before),
			"after" => Ok(Self::After),
			_ => Err("expected `before` or `after`".to_string()),
		}
	}
}

impl fmt::Display for LineOrder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Before => f.write_str("before"),
			Self::After => f.write_str("after"),
		}
	}
}

/// When in the run a plugin is eligible to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PluginStage {
	/// As each script is first ingested. The only phase in which new scripts
	/// may be created.
	OnLoad,
	/// Once every reachable script has been loaded, in final emission order.
	OnFinishUp,
}

impl FromStr for PluginStage {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.to_ascii_lowercase().as_str() {
			"onload" => Ok(Self::OnLoad),
			"onfinishup" => Ok(Self::OnFinishUp),
			_ => Err("expected `onload` or `onfinishup`".to_string()),
		}
	}
}

impl fmt::Display for PluginStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::OnLoad => f.write_str("onload"),
			Self::OnFinishUp => f.write_str("onfinishup"),
		}
	}
}

/// Which transforms a plugin implements. The chain dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransformKind {
	Line,
	FullScript,
	Both,
}

impl TransformKind {
	pub fn has_line(self) -> bool {
		matches!(self, Self::Line | Self::Both)
	}

	pub fn has_full_script(self) -> bool {
		matches!(self, Self::FullScript | Self::Both)
	}
}

/// Declarative facts about a plugin: the prefixes its settings live under,
/// its phase and order, and the sentinel lines the cleanup pass strips for
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
	pub prefixes: Vec<&'static str>,
	pub order: LineOrder,
	pub stage: PluginStage,
	pub cleanup_tokens: BTreeSet<String>,
}

/// What a transform can reach while it runs. The borrow of the source manager
/// lasts for one call only.
pub struct PluginContext<'a> {
	/// The script being transformed.
	pub script: &'a SourceScript,
	/// Enqueue, create and reorder scripts. Creation only succeeds during the
	/// `OnLoad` phase.
	pub sources: &'a mut SourceManager,
	pub fs: &'a dyn FileSystem,
	pub definitions: &'a Definitions,
}

/// A unit of transformation over lines or whole scripts.
pub trait Plugin {
	/// Human-readable plugin name.
	fn name(&self) -> &'static str;

	/// The plugin's current descriptor. Read once, after
	/// [`Plugin::initialize`], when the chain is built.
	fn descriptor(&self) -> PluginDescriptor;

	fn kind(&self) -> TransformKind;

	/// The options this plugin accepts.
	fn options(&self) -> Vec<OptionInfo> {
		Vec::new()
	}

	/// Called once before any transform. Typically applies `settings`; may
	/// also install a resolution scheme on `sources`.
	fn initialize(
		&mut self,
		settings: &Settings,
		sources: &mut SourceManager,
		definitions: &Definitions,
	) -> SrcppResult<()>;

	/// Transform one line in isolation. Returning one of the plugin's cleanup
	/// tokens marks the line for removal at the end of the phase.
	fn line_transform(&mut self, line: &str) -> String {
		line.to_string()
	}

	/// Transform the complete line sequence of a script.
	fn full_script_transform(
		&mut self,
		lines: Vec<String>,
		_ctx: &mut PluginContext<'_>,
	) -> SrcppResult<Vec<String>> {
		Ok(lines)
	}
}
