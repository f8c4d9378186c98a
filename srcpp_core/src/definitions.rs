use std::collections::BTreeSet;

/// Definition table shared with plugins. The engine only passes it through;
/// what a definition means is up to the plugins that read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
	names: BTreeSet<String>,
}

impl Definitions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn define(&mut self, name: impl Into<String>) {
		self.names.insert(name.into());
	}

	pub fn undefine(&mut self, name: &str) {
		self.names.remove(name);
	}

	pub fn is_defined(&self, name: &str) -> bool {
		self.names.contains(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.names.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}

impl<S: Into<String>> FromIterator<S> for Definitions {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			names: iter.into_iter().map(Into::into).collect(),
		}
	}
}
