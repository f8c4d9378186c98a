use std::collections::BTreeSet;
use std::fmt;

use crate::Definitions;
use crate::LineOrder;
use crate::Plugin;
use crate::PluginContext;
use crate::PluginDescriptor;
use crate::PluginStage;
use crate::Settings;
use crate::SourceManager;
use crate::SrcppResult;
use crate::cleanup::cleanup_lines;
use crate::cleanup::collect_cleanup_tokens;

/// Position of a step within one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
	LineBefore,
	FullScript,
	LineAfter,
}

#[derive(Debug, Clone, Copy)]
struct ChainStep {
	stage: PluginStage,
	slot: Slot,
	plugin: usize,
}

/// The ordered plugin chain of one run.
///
/// Within a phase, each script goes through `Before` line transforms, then
/// full-script transforms, then `After` line transforms, each group in chain
/// order, and finally the cleanup pass.
pub struct PluginChain {
	plugins: Vec<Box<dyn Plugin>>,
	descriptors: Vec<PluginDescriptor>,
	steps: Vec<ChainStep>,
	cleanup_tokens: BTreeSet<String>,
}

impl fmt::Debug for PluginChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginChain")
			.field(
				"plugins",
				&self.plugins.iter().map(|plugin| plugin.name()).collect::<Vec<_>>(),
			)
			.field("steps", &self.steps)
			.field("cleanup_tokens", &self.cleanup_tokens)
			.finish()
	}
}

impl PluginChain {
	pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
		Self {
			plugins,
			descriptors: Vec::new(),
			steps: Vec::new(),
			cleanup_tokens: BTreeSet::new(),
		}
	}

	/// Initialize every plugin in chain order, then fix the execution order
	/// and cleanup tokens from the resulting descriptors.
	pub fn initialize(
		&mut self,
		settings: &Settings,
		sources: &mut SourceManager,
		definitions: &Definitions,
	) -> SrcppResult<()> {
		for plugin in &mut self.plugins {
			plugin.initialize(settings, sources, definitions)?;
			tracing::debug!(plugin = plugin.name(), "initialized plugin");
		}

		self.descriptors = self.plugins.iter().map(|plugin| plugin.descriptor()).collect();
		self.cleanup_tokens = collect_cleanup_tokens(&self.descriptors);
		self.steps = build_steps(&self.plugins, &self.descriptors);

		Ok(())
	}

	pub fn cleanup_tokens(&self) -> &BTreeSet<String> {
		&self.cleanup_tokens
	}

	pub fn descriptors(&self) -> &[PluginDescriptor] {
		&self.descriptors
	}

	pub fn plugin_names(&self) -> Vec<&'static str> {
		self.plugins.iter().map(|plugin| plugin.name()).collect()
	}

	pub fn has_stage(&self, stage: PluginStage) -> bool {
		self.steps.iter().any(|step| step.stage == stage)
	}

	/// Run every step of `stage` over `lines`, then the cleanup pass.
	pub fn run_phase(
		&mut self,
		stage: PluginStage,
		mut lines: Vec<String>,
		ctx: &mut PluginContext<'_>,
	) -> SrcppResult<Vec<String>> {
		for step in self.steps.iter().filter(|step| step.stage == stage) {
			let plugin = &mut self.plugins[step.plugin];
			lines = match step.slot {
				Slot::LineBefore | Slot::LineAfter => {
					lines
						.iter()
						.map(|line| plugin.line_transform(line))
						.collect()
				}
				Slot::FullScript => plugin.full_script_transform(lines, ctx)?,
			};
		}

		Ok(cleanup_lines(lines, &self.cleanup_tokens))
	}
}

fn build_steps(plugins: &[Box<dyn Plugin>], descriptors: &[PluginDescriptor]) -> Vec<ChainStep> {
	let mut steps = Vec::new();

	for (index, (plugin, descriptor)) in plugins.iter().zip(descriptors).enumerate() {
		let kind = plugin.kind();
		if kind.has_line() {
			let slot = match descriptor.order {
				LineOrder::Before => Slot::LineBefore,
				LineOrder::After => Slot::LineAfter,
			};
			steps.push(ChainStep {
				stage: descriptor.stage,
				slot,
				plugin: index,
			});
		}
		if kind.has_full_script() {
			steps.push(ChainStep {
				stage: descriptor.stage,
				slot: Slot::FullScript,
				plugin: index,
			});
		}
	}

	// Stable sort keeps chain order inside each slot.
	steps.sort_by_key(|step| (step.stage, step.slot));
	steps
}
