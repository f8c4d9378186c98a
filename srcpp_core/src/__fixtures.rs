use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;

use crate::Definitions;
use crate::LineOrder;
use crate::MemoryFileSystem;
use crate::Plugin;
use crate::PluginContext;
use crate::PluginDescriptor;
use crate::PluginStage;
use crate::Settings;
use crate::SourceManager;
use crate::SourceScript;
use crate::SrcppResult;
use crate::TransformKind;

pub fn lines(text: &[&str]) -> Vec<String> {
	text.iter().map(|line| (*line).to_string()).collect()
}

pub fn tokens(text: &[&str]) -> Vec<String> {
	lines(text)
}

pub fn unlocked_manager() -> SourceManager {
	let mut manager = SourceManager::new();
	manager.set_lock(false);
	manager
}

/// Create a script for the absolute `path` through the manager's factory.
pub fn create_script(manager: &SourceManager, path: &str, content: &[&str]) -> SourceScript {
	let resolution = manager.resolve(&tokens(&[path]), Path::new("/"));
	manager
		.try_create("\n", lines(content), resolution)
		.unwrap_or_else(|| panic!("could not create script for `{path}`"))
}

/// Three files that include each other in a cycle: a → b → c → a.
pub fn cyclic_fs() -> MemoryFileSystem {
	MemoryFileSystem::new()
		.with_file("/virtual/a.cl", "#include \"b.cl\"\na body\n")
		.with_file("/virtual/b.cl", "#include \"c.cl\"\nb body\n")
		.with_file("/virtual/c.cl", "#include \"a.cl\"\nc body\n")
}

/// Appends `|<name>` to every line it sees, so the final line records the
/// order plugins ran in.
pub struct TaggingPlugin {
	pub tag: &'static str,
	pub kind: TransformKind,
	pub order: LineOrder,
	pub stage: PluginStage,
}

impl TaggingPlugin {
	pub fn boxed(
		tag: &'static str,
		kind: TransformKind,
		order: LineOrder,
		stage: PluginStage,
	) -> Box<dyn Plugin> {
		Box::new(Self {
			tag,
			kind,
			order,
			stage,
		})
	}
}

impl Plugin for TaggingPlugin {
	fn name(&self) -> &'static str {
		self.tag
	}

	fn descriptor(&self) -> PluginDescriptor {
		PluginDescriptor {
			prefixes: vec![self.tag],
			order: self.order,
			stage: self.stage,
			cleanup_tokens: BTreeSet::new(),
		}
	}

	fn kind(&self) -> TransformKind {
		self.kind
	}

	fn initialize(
		&mut self,
		_settings: &Settings,
		_sources: &mut SourceManager,
		_definitions: &Definitions,
	) -> SrcppResult<()> {
		Ok(())
	}

	fn line_transform(&mut self, line: &str) -> String {
		format!("{line}|{}", self.tag)
	}

	fn full_script_transform(
		&mut self,
		lines: Vec<String>,
		_ctx: &mut PluginContext<'_>,
	) -> SrcppResult<Vec<String>> {
		Ok(lines
			.into_iter()
			.map(|line| format!("{line}|{}", self.tag))
			.collect())
	}
}

/// Records the file name of every script it is run on, and whether the
/// script could create a new file at that point.
pub struct ProbePlugin {
	pub stage: PluginStage,
	pub seen: Rc<RefCell<Vec<String>>>,
	pub created: Rc<RefCell<Vec<bool>>>,
	pub definitions: Rc<RefCell<Vec<String>>>,
}

impl ProbePlugin {
	pub fn new(stage: PluginStage) -> Self {
		Self {
			stage,
			seen: Rc::default(),
			created: Rc::default(),
			definitions: Rc::default(),
		}
	}
}

impl Plugin for ProbePlugin {
	fn name(&self) -> &'static str {
		"probe"
	}

	fn descriptor(&self) -> PluginDescriptor {
		PluginDescriptor {
			prefixes: vec!["probe"],
			order: LineOrder::After,
			stage: self.stage,
			cleanup_tokens: BTreeSet::new(),
		}
	}

	fn kind(&self) -> TransformKind {
		TransformKind::FullScript
	}

	fn initialize(
		&mut self,
		_settings: &Settings,
		_sources: &mut SourceManager,
		definitions: &Definitions,
	) -> SrcppResult<()> {
		self.definitions
			.borrow_mut()
			.extend(definitions.iter().map(str::to_string));
		Ok(())
	}

	fn full_script_transform(
		&mut self,
		lines: Vec<String>,
		ctx: &mut PluginContext<'_>,
	) -> SrcppResult<Vec<String>> {
		self.seen
			.borrow_mut()
			.push(ctx.script.display_name().to_string());

		let resolution = ctx
			.sources
			.resolve(&tokens(&["probe-generated.cl"]), ctx.script.directory());
		let created = ctx.sources.try_create("\n", Vec::new(), resolution);
		self.created.borrow_mut().push(created.is_some());

		Ok(lines)
	}
}
