use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use crate::Definitions;
use crate::LineOrder;
use crate::OptionInfo;
use crate::OptionTable;
use crate::Plugin;
use crate::PluginContext;
use crate::PluginDescriptor;
use crate::PluginStage;
use crate::Settings;
use crate::SourceManager;
use crate::SrcppResult;
use crate::TransformKind;
use crate::parse_option;
use crate::plugins::DEFAULT_REMOVAL_KEYWORD;
use crate::resolution::unquote_token;

/// Default directive keyword.
pub const DEFAULT_INCLUDE_KEYWORD: &str = "#include";

/// Prefixes the includer's settings are read from.
pub const INCLUDER_PREFIXES: [&str; 2] = ["inc", "Include"];

static OPTIONS: LazyLock<OptionTable<Includer>> = LazyLock::new(|| {
	OptionTable::<Includer>::new()
		.option(
			"set-keyword",
			"kw",
			"Keyword that starts an include directive.",
			|plugin, value| {
				plugin.keyword = value.trim().to_string();
				Ok(())
			},
		)
		.option(
			"set-removekeyword",
			"k",
			"Written in place of a directive line. Removed again by the cleanup pass.",
			|plugin, value| {
				plugin.removal_keyword = value.to_string();
				Ok(())
			},
		)
		.option(
			"set-separator",
			"sep",
			"Separator recorded on scripts created for included files.",
			|plugin, value| {
				plugin.separator = value.to_string();
				Ok(())
			},
		)
		.option(
			"set-order",
			"o",
			"Accepted for symmetry with line plugins. The includer has no line transform.",
			|plugin, value| {
				plugin.order = parse_option("set-order", value)?;
				Ok(())
			},
		)
		.option(
			"set-stage",
			"ss",
			"Run the plugin `onload` or `onfinishup`. Includes only take effect on load.",
			|plugin, value| {
				plugin.stage = parse_option("set-stage", value)?;
				Ok(())
			},
		)
});

/// Follows include directives.
///
/// A line whose trimmed form starts with the keyword (`#include` by default)
/// names one more file. The file is resolved with the source manager's active
/// scheme relative to the including script's directory. An unseen file is
/// read, created and queued; a file that is already tracked is moved to the
/// end of the emission order. Either way the directive line itself is
/// replaced by the removal keyword.
///
/// A `*` in the file name expands to every matching file below the pattern's
/// directory, including nested directories, in sorted path order. The
/// including script itself is skipped. A pattern that matches nothing, or
/// whose directory does not exist, only logs a warning.
///
/// ```text
/// #include "shared/util.cl"
/// #include kernels/*.cl
/// #include "tile.cl" WIDTH=4
/// ```
#[derive(Debug, Clone)]
pub struct Includer {
	keyword: String,
	removal_keyword: String,
	separator: String,
	order: LineOrder,
	stage: PluginStage,
}

impl Default for Includer {
	fn default() -> Self {
		Self {
			keyword: DEFAULT_INCLUDE_KEYWORD.to_string(),
			removal_keyword: DEFAULT_REMOVAL_KEYWORD.to_string(),
			separator: "\n".to_string(),
			order: LineOrder::After,
			stage: PluginStage::OnLoad,
		}
	}
}

impl Includer {
	pub fn new() -> Self {
		Self::default()
	}

	/// The reference part of `line` when it is a directive.
	fn directive<'l>(&self, line: &'l str) -> Option<&'l str> {
		let rest = line.trim().strip_prefix(self.keyword.as_str())?;
		// `#includes` is not `#include`.
		if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
			return None;
		}

		Some(rest.trim())
	}

	fn include(&self, reference: &str, ctx: &mut PluginContext<'_>) -> SrcppResult<()> {
		let tokens = split_reference_tokens(reference);
		let directory = ctx.script.directory().to_path_buf();

		let Some(first) = tokens.first() else {
			tracing::warn!(
				file = ctx.script.display_name(),
				"include directive without a reference"
			);
			return Ok(());
		};

		if !first.contains('*') {
			self.include_tokens(&tokens, &directory, ctx)?;
			return Ok(());
		}

		let Some(pattern_path) = unquote_token(first).map(|pattern| directory.join(pattern)) else {
			return Ok(());
		};
		let (Some(pattern_dir), Some(pattern)) = (
			pattern_path.parent(),
			pattern_path.file_name().and_then(|name| name.to_str()),
		) else {
			tracing::warn!(reference, "wildcard include has no file name pattern");
			return Ok(());
		};

		let matches = match ctx.fs.list_files(pattern_dir, pattern) {
			Ok(matches) => matches,
			Err(e) => {
				tracing::warn!(reference, error = %e, "could not expand wildcard include");
				return Ok(());
			}
		};
		if matches.is_empty() {
			tracing::warn!(reference, "wildcard include matched no files");
		}

		for path in matches {
			let mut expanded = Vec::with_capacity(tokens.len());
			expanded.push(path.to_string_lossy().into_owned());
			expanded.extend(tokens[1..].iter().cloned());

			// A pattern never includes the script it is written in.
			let resolution = ctx.sources.resolve(&expanded, &directory);
			if resolution.key() == Some(ctx.script.key().as_str()) {
				continue;
			}

			self.include_tokens(&expanded, &directory, ctx)?;
		}

		Ok(())
	}

	fn include_tokens(
		&self,
		tokens: &[String],
		directory: &Path,
		ctx: &mut PluginContext<'_>,
	) -> SrcppResult<()> {
		let resolution = ctx.sources.resolve(tokens, directory);
		let Some(key) = resolution.key().map(str::to_string) else {
			tracing::warn!(
				reference = %tokens.join(" "),
				file = ctx.script.display_name(),
				"could not resolve include reference"
			);
			return Ok(());
		};

		if ctx.sources.contains_key(&key) {
			ctx.sources.reorder_to_end(&key);
			return Ok(());
		}

		let Some(path) = resolution.path() else {
			return Ok(());
		};
		if !ctx.fs.file_exists(&path) {
			tracing::warn!(
				path = %path.display(),
				file = ctx.script.display_name(),
				"included file does not exist"
			);
			return Ok(());
		}

		let lines = ctx.fs.read_all_lines(&path)?;
		if let Some(script) = ctx.sources.try_create(&self.separator, lines, resolution) {
			ctx.sources.enqueue(script);
		}

		Ok(())
	}
}

impl Plugin for Includer {
	fn name(&self) -> &'static str {
		"Includer"
	}

	fn descriptor(&self) -> PluginDescriptor {
		PluginDescriptor {
			prefixes: INCLUDER_PREFIXES.to_vec(),
			order: self.order,
			stage: self.stage,
			cleanup_tokens: BTreeSet::from([
				self.removal_keyword.clone(),
				self.removal_keyword.to_lowercase(),
			]),
		}
	}

	fn kind(&self) -> TransformKind {
		TransformKind::FullScript
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
		OPTIONS.apply(settings, &INCLUDER_PREFIXES, self)
	}

	fn full_script_transform(
		&mut self,
		lines: Vec<String>,
		ctx: &mut PluginContext<'_>,
	) -> SrcppResult<Vec<String>> {
		let mut output = Vec::with_capacity(lines.len());

		for line in lines {
			match self.directive(&line) {
				Some(reference) => {
					self.include(reference, ctx)?;
					output.push(self.removal_keyword.clone());
				}
				None => output.push(line),
			}
		}

		Ok(output)
	}
}

/// Split the reference part of a directive on whitespace. Quoted tokens keep
/// their quotes and inner whitespace so the resolution scheme can unquote
/// them.
pub(crate) fn split_reference_tokens(reference: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	let mut current = String::new();
	let mut quote: Option<char> = None;
	let mut escaped = false;

	for ch in reference.chars() {
		match quote {
			Some(open) => {
				current.push(ch);
				if escaped {
					escaped = false;
				} else if ch == '\\' {
					escaped = true;
				} else if ch == open {
					quote = None;
				}
			}
			None if ch.is_whitespace() => {
				if !current.is_empty() {
					tokens.push(std::mem::take(&mut current));
				}
			}
			None => {
				if ch == '"' || ch == '\'' {
					quote = Some(ch);
				}
				current.push(ch);
			}
		}
	}

	if !current.is_empty() {
		tokens.push(current);
	}

	tokens
}
