use std::ops::Deref;
use std::ops::DerefMut;
use std::path::Path;

use serde::Serialize;

use crate::ResolutionResult;
use crate::ResolutionScheme;
use crate::ScriptKey;
use crate::SourceScript;

/// Processing state of a tracked script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum ProcessStage {
	/// Waiting to be run through the `OnLoad` plugins.
	Queued,
	/// Already processed. Never handed out by
	/// [`SourceManager::next_ready`] again.
	Done,
}

/// A script together with its processing stage. Keeping both in one entry
/// means reordering can never separate a script from its stage.
#[derive(Debug, Clone)]
pub struct TrackedScript {
	script: SourceScript,
	stage: ProcessStage,
}

impl TrackedScript {
	pub fn script(&self) -> &SourceScript {
		&self.script
	}

	pub fn stage(&self) -> ProcessStage {
		self.stage
	}
}

/// Tracks which scripts take part in a preprocessing run, the order they
/// will be emitted in, and how far each one has been processed.
///
/// None of the operations fail for expected conditions. Enqueuing a known
/// key, updating an unknown key, or creating a script while creation is
/// locked are all quiet no-ops (the last one logs a warning).
#[derive(Debug)]
pub struct SourceManager {
	entries: Vec<TrackedScript>,
	scheme: ResolutionScheme,
	creation_locked: bool,
}

impl Default for SourceManager {
	fn default() -> Self {
		Self {
			entries: Vec::new(),
			scheme: ResolutionScheme::default(),
			creation_locked: true,
		}
	}
}

impl SourceManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the active resolution scheme. `None` keeps the current one.
	pub fn set_scheme(&mut self, scheme: Option<ResolutionScheme>) {
		let Some(scheme) = scheme else {
			return;
		};

		tracing::debug!(scheme = scheme.name(), "changed resolution scheme");
		self.scheme = scheme;
	}

	pub fn scheme_name(&self) -> &str {
		self.scheme.name()
	}

	/// Resolve a reference with the active scheme.
	pub fn resolve(&self, tokens: &[String], current_dir: &Path) -> ResolutionResult {
		self.scheme.resolve(tokens, current_dir)
	}

	/// Append a script in stage [`ProcessStage::Queued`]. Does nothing when a
	/// script with the same key is already tracked.
	pub fn enqueue(&mut self, script: SourceScript) {
		if self.is_included(&script) {
			return;
		}

		tracing::debug!(key = %script.key(), file = script.display_name(), "queued script");
		self.entries.push(TrackedScript {
			script,
			stage: ProcessStage::Queued,
		});
	}

	/// The earliest script still waiting to be processed.
	pub fn next_ready(&self) -> Option<&SourceScript> {
		self.entries
			.iter()
			.find(|entry| entry.stage == ProcessStage::Queued)
			.map(|entry| &entry.script)
	}

	pub fn is_included(&self, script: &SourceScript) -> bool {
		self.contains_key(script.key())
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.position(key).is_some()
	}

	pub fn stage_of(&self, key: &str) -> Option<ProcessStage> {
		self.position(key).map(|index| self.entries[index].stage)
	}

	/// Update the stage of the script with `key`. Unknown keys are ignored.
	pub fn set_stage(&mut self, key: &str, stage: ProcessStage) {
		let Some(index) = self.position(key) else {
			return;
		};

		let entry = &mut self.entries[index];
		entry.stage = stage;
		tracing::debug!(key, file = entry.script.display_name(), ?stage, "updated script stage");
	}

	/// Move the script with `key` to the end of the emission order, keeping
	/// its stage. A script referenced again is therefore emitted after every
	/// script currently known. Unknown keys are ignored.
	pub fn reorder_to_end(&mut self, key: &str) {
		let Some(index) = self.position(key) else {
			return;
		};

		let entry = self.entries.remove(index);
		tracing::debug!(
			key,
			file = entry.script.display_name(),
			"moved script to end of emission order"
		);
		self.entries.push(entry);
	}

	/// Number of scripts still in stage [`ProcessStage::Queued`].
	pub fn pending_count(&self) -> usize {
		self.entries
			.iter()
			.filter(|entry| entry.stage == ProcessStage::Queued)
			.count()
	}

	/// Lock (`true`) or unlock (`false`) script creation through
	/// [`SourceManager::try_create`].
	pub fn set_lock(&mut self, locked: bool) {
		self.creation_locked = locked;
	}

	pub fn is_locked(&self) -> bool {
		self.creation_locked
	}

	/// Unlock script creation until the returned guard is dropped. The guard
	/// dereferences to the manager, so the ingestion loop works through it.
	pub fn ingestion(&mut self) -> IngestionGuard<'_> {
		let previously_locked = self.creation_locked;
		self.creation_locked = false;

		IngestionGuard {
			manager: self,
			previously_locked,
		}
	}

	/// Create a new, unattached script. Returns `None` while creation is
	/// locked or when `resolution` did not succeed. The caller decides whether
	/// to [`enqueue`](SourceManager::enqueue) the result.
	pub fn try_create(
		&self,
		separator: &str,
		raw_lines: Vec<String>,
		resolution: ResolutionResult,
	) -> Option<SourceScript> {
		if self.creation_locked {
			tracing::warn!(
				key = resolution.key().unwrap_or_default(),
				"plugin attempted file creation outside the permitted stage"
			);
			return None;
		}

		SourceScript::from_resolution(separator, raw_lines, resolution)
	}

	/// Scripts in emission order.
	pub fn scripts(&self) -> impl Iterator<Item = &SourceScript> {
		self.entries.iter().map(|entry| &entry.script)
	}

	pub fn entries(&self) -> &[TrackedScript] {
		&self.entries
	}

	/// Keys in emission order.
	pub fn keys(&self) -> Vec<ScriptKey> {
		self.scripts().map(|script| script.key().clone()).collect()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn position(&self, key: &str) -> Option<usize> {
		self.entries
			.iter()
			.position(|entry| entry.script.key().as_str() == key)
	}
}

/// Proof that script creation is currently allowed. Created by
/// [`SourceManager::ingestion`]; restores the previous lock state on drop.
#[derive(Debug)]
pub struct IngestionGuard<'a> {
	manager: &'a mut SourceManager,
	previously_locked: bool,
}

impl Deref for IngestionGuard<'_> {
	type Target = SourceManager;

	fn deref(&self) -> &Self::Target {
		self.manager
	}
}

impl DerefMut for IngestionGuard<'_> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.manager
	}
}

impl Drop for IngestionGuard<'_> {
	fn drop(&mut self) {
		self.manager.creation_locked = self.previously_locked;
	}
}
