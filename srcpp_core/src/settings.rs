use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::SrcppError;
use crate::SrcppResult;

/// Resolved configuration handed to every plugin at initialization.
///
/// Values are addressed by plugin prefix and option name, e.g. `blr` and
/// `set-removekeyword` (or the shortcut `k`). The settings object only stores
/// strings; each plugin's [`OptionTable`] decides how to apply them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
	entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl Settings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set `option` for the plugin registered under `prefix`, replacing any
	/// earlier value.
	pub fn set(
		&mut self,
		prefix: impl Into<String>,
		option: impl Into<String>,
		value: impl Into<String>,
	) {
		self.entries
			.entry(prefix.into())
			.or_default()
			.insert(option.into(), value.into());
	}

	/// Parse and set an entry written as `<prefix>:<option>=<value>`.
	pub fn set_entry(&mut self, entry: &str) -> SrcppResult<()> {
		let (target, value) = entry
			.split_once('=')
			.ok_or_else(|| SrcppError::MalformedSetting(entry.to_string()))?;
		let (prefix, option) = target
			.split_once(':')
			.ok_or_else(|| SrcppError::MalformedSetting(entry.to_string()))?;

		let prefix = prefix.trim();
		let option = option.trim();
		if prefix.is_empty() || option.is_empty() {
			return Err(SrcppError::MalformedSetting(entry.to_string()));
		}

		self.set(prefix, option, value);
		Ok(())
	}

	/// Copy every entry of `other` into `self`. Entries in `other` win.
	pub fn merge(&mut self, other: Settings) {
		for (prefix, options) in other.entries {
			self.entries.entry(prefix).or_default().extend(options);
		}
	}

	pub fn get(&self, prefix: &str, option: &str) -> Option<&str> {
		self.entries
			.get(prefix)
			.and_then(|options| options.get(option))
			.map(String::as_str)
	}

	/// All `(option, value)` pairs stored for `prefix`.
	pub fn options_for(&self, prefix: &str) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.get(prefix)
			.into_iter()
			.flat_map(|options| options.iter())
			.map(|(option, value)| (option.as_str(), value.as_str()))
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Public description of one plugin option, used for help output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionInfo {
	pub command: &'static str,
	pub shortcut: &'static str,
	pub help: &'static str,
}

impl fmt::Display for OptionInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}({}): {}", self.command, self.shortcut, self.help)
	}
}

/// Setter invoked with the raw option value.
pub type OptionSetter<P> = fn(&mut P, &str) -> SrcppResult<()>;

struct OptionEntry<P> {
	info: OptionInfo,
	setter: OptionSetter<P>,
}

/// The options a plugin of type `P` accepts, each bound to a setter. Built
/// once when the plugin is constructed.
pub struct OptionTable<P> {
	entries: Vec<OptionEntry<P>>,
}

impl<P> Default for OptionTable<P> {
	fn default() -> Self {
		Self {
			entries: Vec::new(),
		}
	}
}

impl<P> fmt::Debug for OptionTable<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.entries.iter().map(|entry| &entry.info))
			.finish()
	}
}

impl<P> OptionTable<P> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register an option.
	#[must_use]
	pub fn option(
		mut self,
		command: &'static str,
		shortcut: &'static str,
		help: &'static str,
		setter: OptionSetter<P>,
	) -> Self {
		self.entries.push(OptionEntry {
			info: OptionInfo {
				command,
				shortcut,
				help,
			},
			setter,
		});
		self
	}

	pub fn infos(&self) -> Vec<OptionInfo> {
		self.entries.iter().map(|entry| entry.info.clone()).collect()
	}

	/// Apply every setting stored under any of `prefixes` to `target`. An
	/// option name may be either the command or its shortcut.
	pub fn apply(&self, settings: &Settings, prefixes: &[&str], target: &mut P) -> SrcppResult<()> {
		for prefix in prefixes {
			for (option, value) in settings.options_for(prefix) {
				let entry = self
					.entries
					.iter()
					.find(|entry| entry.info.command == option || entry.info.shortcut == option)
					.ok_or_else(|| {
						SrcppError::UnknownOption {
							prefix: (*prefix).to_string(),
							option: option.to_string(),
						}
					})?;

				(entry.setter)(target, value)?;
			}
		}

		Ok(())
	}
}

/// Parse an option value with [`FromStr`], mapping failures to
/// [`SrcppError::InvalidOptionValue`].
pub fn parse_option<T>(option: &str, value: &str) -> SrcppResult<T>
where
	T: FromStr,
	T::Err: fmt::Display,
{
	value.trim().parse().map_err(|e: T::Err| {
		SrcppError::InvalidOptionValue {
			option: option.to_string(),
			value: value.to_string(),
			reason: e.to_string(),
		}
	})
}
