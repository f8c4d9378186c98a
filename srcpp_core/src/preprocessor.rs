use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::Definitions;
use crate::FileSystem;
use crate::Plugin;
use crate::PluginChain;
use crate::PluginContext;
use crate::PluginStage;
use crate::ProcessStage;
use crate::ResolutionScheme;
use crate::ScriptKey;
use crate::Settings;
use crate::SourceManager;
use crate::SourceScript;
use crate::SrcppError;
use crate::SrcppResult;

/// One script of the merged artifact after every phase has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedScript {
	pub key: ScriptKey,
	pub path: PathBuf,
	pub lines: Vec<String>,
}

/// Result of a preprocessing run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreprocessOutput {
	/// Scripts in emission order.
	pub scripts: Vec<ProcessedScript>,
}

impl PreprocessOutput {
	/// Keys in emission order.
	pub fn order(&self) -> Vec<&ScriptKey> {
		self.scripts.iter().map(|script| &script.key).collect()
	}

	/// Every line of every script, in emission order.
	pub fn lines(&self) -> impl Iterator<Item = &str> {
		self.scripts
			.iter()
			.flat_map(|script| script.lines.iter().map(String::as_str))
	}

	/// The merged artifact: all lines joined with `\n`.
	pub fn merged(&self) -> String {
		self.merged_with("\n")
	}

	pub fn merged_with(&self, separator: &str) -> String {
		self.lines().collect::<Vec<_>>().join(separator)
	}
}

/// Runs a plugin chain over a set of input files.
///
/// ```rust,no_run
/// use srcpp_core::DiskFileSystem;
/// use srcpp_core::Preprocessor;
/// use srcpp_core::plugins::build_chain;
/// use std::path::PathBuf;
///
/// let output = Preprocessor::new(DiskFileSystem)
///     .with_plugins(build_chain(&["inc", "blr"]).unwrap())
///     .run(&[PathBuf::from("kernels/main.cl")])
///     .unwrap();
///
/// println!("{}", output.merged());
/// ```
pub struct Preprocessor<F: FileSystem> {
	fs: F,
	plugins: Vec<Box<dyn Plugin>>,
	settings: Settings,
	definitions: Definitions,
	separator: String,
	base_dir: PathBuf,
	scheme: Option<ResolutionScheme>,
}

impl<F: FileSystem> Preprocessor<F> {
	pub fn new(fs: F) -> Self {
		Self {
			fs,
			plugins: Vec::new(),
			settings: Settings::default(),
			definitions: Definitions::default(),
			separator: "\n".to_string(),
			base_dir: PathBuf::new(),
			scheme: None,
		}
	}

	#[must_use]
	pub fn with_plugin(mut self, plugin: Box<dyn Plugin>) -> Self {
		self.plugins.push(plugin);
		self
	}

	#[must_use]
	pub fn with_plugins(mut self, plugins: impl IntoIterator<Item = Box<dyn Plugin>>) -> Self {
		self.plugins.extend(plugins);
		self
	}

	#[must_use]
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	#[must_use]
	pub fn with_definitions(mut self, definitions: Definitions) -> Self {
		self.definitions = definitions;
		self
	}

	/// Separator recorded on the seed scripts.
	#[must_use]
	pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
		self.separator = separator.into();
		self
	}

	/// Directory relative input paths are resolved against. Defaults to the
	/// process working directory.
	#[must_use]
	pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
		self.base_dir = base_dir.into();
		self
	}

	/// Resolution scheme installed before plugins are initialized.
	#[must_use]
	pub fn with_scheme(mut self, scheme: ResolutionScheme) -> Self {
		self.scheme = Some(scheme);
		self
	}

	/// Preprocess `inputs` and everything reachable from them.
	///
	/// 1. Plugins are initialized and the chain order is fixed.
	/// 2. Inputs are seeded and every queued script is run through the
	///    `OnLoad` phase, one at a time, until none is left. Script creation
	///    is only unlocked during this step.
	/// 3. Every script runs through the `OnFinishUp` phase in final order.
	pub fn run(self, inputs: &[PathBuf]) -> SrcppResult<PreprocessOutput> {
		let Self {
			fs,
			plugins,
			settings,
			definitions,
			separator,
			base_dir,
			scheme,
		} = self;

		let mut sources = SourceManager::new();
		sources.set_scheme(scheme);

		let mut chain = PluginChain::new(plugins);
		chain.initialize(&settings, &mut sources, &definitions)?;

		let mut loaded: HashMap<ScriptKey, Vec<String>> = HashMap::new();

		{
			let mut ingestion = sources.ingestion();
			for input in inputs {
				let script = load_input(&fs, &ingestion, &base_dir, input, &separator)?;
				ingestion.enqueue(script);
			}

			while let Some(script) = ingestion.next_ready().cloned() {
				tracing::debug!(key = %script.key(), "processing script");
				let mut ctx = PluginContext {
					script: &script,
					sources: &mut *ingestion,
					fs: &fs,
					definitions: &definitions,
				};
				let lines =
					chain.run_phase(PluginStage::OnLoad, script.raw_lines().to_vec(), &mut ctx)?;

				loaded.insert(script.key().clone(), lines);
				ingestion.set_stage(script.key(), ProcessStage::Done);
			}
		}

		let scripts: Vec<SourceScript> = sources.scripts().cloned().collect();
		let mut finished: HashMap<ScriptKey, Vec<String>> = HashMap::with_capacity(scripts.len());
		for script in &scripts {
			let lines = loaded.remove(script.key()).unwrap_or_default();
			let mut ctx = PluginContext {
				script,
				sources: &mut sources,
				fs: &fs,
				definitions: &definitions,
			};
			let lines = chain.run_phase(PluginStage::OnFinishUp, lines, &mut ctx)?;
			finished.insert(script.key().clone(), lines);
		}

		let scripts = sources
			.scripts()
			.map(|script| {
				ProcessedScript {
					key: script.key().clone(),
					path: script.path().to_path_buf(),
					lines: finished.remove(script.key()).unwrap_or_default(),
				}
			})
			.collect();

		Ok(PreprocessOutput { scripts })
	}
}

fn load_input<F: FileSystem>(
	fs: &F,
	sources: &SourceManager,
	base_dir: &Path,
	input: &Path,
	separator: &str,
) -> SrcppResult<SourceScript> {
	let reference = input.to_string_lossy().into_owned();
	let resolution = sources.resolve(std::slice::from_ref(&reference), base_dir);
	let Some(path) = resolution.path() else {
		return Err(SrcppError::UnresolvedInput(reference));
	};

	if !fs.file_exists(&path) {
		return Err(SrcppError::MissingInput(path.display().to_string()));
	}

	let lines = fs.read_all_lines(&path)?;
	sources
		.try_create(separator, lines, resolution)
		.ok_or(SrcppError::UnresolvedInput(reference))
}
