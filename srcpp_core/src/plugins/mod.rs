//! Built-in plugins and lookup by prefix.

pub use blank_line_remover::*;
pub use includer::*;

mod blank_line_remover;
mod includer;

use crate::Plugin;
use crate::SrcppError;
use crate::SrcppResult;

/// Chain used when neither the config nor the command line names one.
pub const DEFAULT_CHAIN: [&str; 2] = ["inc", "blr"];

/// A fresh instance of every built-in plugin.
pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
	let includer: Box<dyn Plugin> = Box::new(Includer::new());
	let blank_line_remover: Box<dyn Plugin> = Box::new(BlankLineRemover::new());
	vec![includer, blank_line_remover]
}

/// The built-in plugin registered under `prefix`, if any.
pub fn builtin_plugin(prefix: &str) -> Option<Box<dyn Plugin>> {
	builtin_plugins()
		.into_iter()
		.find(|plugin| plugin.descriptor().prefixes.iter().any(|known| *known == prefix))
}

/// Instantiate a chain from plugin prefixes, keeping their order.
pub fn build_chain<S: AsRef<str>>(prefixes: &[S]) -> SrcppResult<Vec<Box<dyn Plugin>>> {
	prefixes
		.iter()
		.map(|prefix| {
			let prefix = prefix.as_ref();
			builtin_plugin(prefix).ok_or_else(|| SrcppError::UnknownPlugin(prefix.to_string()))
		})
		.collect()
}
