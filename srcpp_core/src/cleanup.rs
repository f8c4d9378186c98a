use std::collections::BTreeSet;

use crate::PluginDescriptor;

/// Gather the cleanup tokens of every descriptor into one set.
pub fn collect_cleanup_tokens<'a>(
	descriptors: impl IntoIterator<Item = &'a PluginDescriptor>,
) -> BTreeSet<String> {
	descriptors
		.into_iter()
		.flat_map(|descriptor| descriptor.cleanup_tokens.iter().cloned())
		.collect()
}

/// Remove every line that is exactly equal to one of `tokens`. Partial matches
/// and surrounding whitespace do not count.
pub fn cleanup_lines(lines: Vec<String>, tokens: &BTreeSet<String>) -> Vec<String> {
	if tokens.is_empty() {
		return lines;
	}

	lines
		.into_iter()
		.filter(|line| !tokens.contains(line))
		.collect()
}
