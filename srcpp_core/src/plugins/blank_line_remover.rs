use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::Definitions;
use crate::LineOrder;
use crate::OptionInfo;
use crate::OptionTable;
use crate::Plugin;
use crate::PluginDescriptor;
use crate::PluginStage;
use crate::Settings;
use crate::SourceManager;
use crate::SrcppResult;
use crate::TransformKind;
use crate::parse_option;

/// Default sentinel written in place of blank lines.
pub const DEFAULT_REMOVAL_KEYWORD: &str = "###REMOVE###";

/// Prefixes the blank line remover's settings are read from.
pub const BLANK_LINE_REMOVER_PREFIXES: [&str; 2] = ["blr", "BLRemover"];

static OPTIONS: LazyLock<OptionTable<BlankLineRemover>> = LazyLock::new(|| {
	OptionTable::<BlankLineRemover>::new()
		.option(
			"set-removekeyword",
			"k",
			"Inserted whenever a blank line is detected. Removed again by the cleanup pass.",
			|plugin, value| {
				plugin.removal_keyword = value.to_string();
				Ok(())
			},
		)
		.option(
			"set-order",
			"o",
			"Run the line transform `before` or `after` the full-script transforms.",
			|plugin, value| {
				plugin.order = parse_option("set-order", value)?;
				Ok(())
			},
		)
		.option(
			"set-stage",
			"ss",
			"Run the plugin `onload` or `onfinishup`.",
			|plugin, value| {
				plugin.stage = parse_option("set-stage", value)?;
				Ok(())
			},
		)
});

/// Marks whitespace-only lines for removal.
#[derive(Debug, Clone)]
pub struct BlankLineRemover {
	removal_keyword: String,
	order: LineOrder,
	stage: PluginStage,
}

impl Default for BlankLineRemover {
	fn default() -> Self {
		Self {
			removal_keyword: DEFAULT_REMOVAL_KEYWORD.to_string(),
			order: LineOrder::After,
			stage: PluginStage::OnFinishUp,
		}
	}
}

impl BlankLineRemover {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn removal_keyword(&self) -> &str {
		&self.removal_keyword
	}
}

impl Plugin for BlankLineRemover {
	fn name(&self) -> &'static str {
		"BlankLineRemover"
	}

	fn descriptor(&self) -> PluginDescriptor {
		let cleanup_tokens = BTreeSet::from([
			self.removal_keyword.clone(),
			self.removal_keyword.to_lowercase(),
		]);

		PluginDescriptor {
			prefixes: BLANK_LINE_REMOVER_PREFIXES.to_vec(),
			order: self.order,
			stage: self.stage,
			cleanup_tokens,
		}
	}

	fn kind(&self) -> TransformKind {
		TransformKind::Line
	}

	fn options(&self) -> Vec<OptionInfo> {
		OPTIONS.infos()
	}

	fn initialize(
		&mut self,
		settings: &Settings,
		_sources: &mut SourceManager,
		_definitions: &Definitions,
	) -> SrcppResult<()> {
		OPTIONS.apply(settings, &BLANK_LINE_REMOVER_PREFIXES, self)
	}

	fn line_transform(&mut self, line: &str) -> String {
		if line.trim().is_empty() {
			tracing::trace!(keyword = %self.removal_keyword, "marked blank line for removal");
			return self.removal_keyword.clone();
		}

		line.to_string()
	}
}
