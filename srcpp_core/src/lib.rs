//! `srcpp_core` is the engine behind the [srcpp](https://github.com/srcpp/srcpp) source preprocessor. It tracks every file a run touches, decides the order files are emitted in, and drives an ordered chain of plugins that rewrite each file line by line and as a whole before the merged result is handed to a downstream compiler.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Input files
//!   → Resolution scheme (reference tokens + directory → canonical key and path)
//!   → Source manager (queue of scripts, emission order, creation lock)
//!   → OnLoad phase, per script (line plugins `before`, full-script plugins, line plugins `after`, cleanup)
//!       ↳ plugins may enqueue newly discovered files or move known ones to the end
//!   → OnFinishUp phase, per script in final order (same steps)
//!   → Merged artifact (all lines, in emission order)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `srcpp.toml`: chain, settings, definitions and inputs.
//! - [`plugins`]: Built-in plugins: the include follower and the blank line remover.
//! - [`cleanup`]: The compaction pass that strips sentinel lines.
//!
//! ## Key Types
//!
//! - [`SourceManager`]: Ordered set of scripts with their processing stage.
//! - [`SourceScript`]: One loaded file, keyed by [`ScriptKey`].
//! - [`ResolutionScheme`]: Strategy that turns a reference into a [`ResolutionResult`].
//! - [`Plugin`]: A transformation unit described by a [`PluginDescriptor`].
//! - [`PluginChain`]: The ordered chain of one run.
//! - [`Preprocessor`]: Runs a chain over a set of inputs and returns a [`PreprocessOutput`].
//! - [`FileSystem`]: Every read goes through this trait; see [`DiskFileSystem`] and [`MemoryFileSystem`].
//!
//! ## Emission Order
//!
//! The order of the source manager is the order of the merged output. A file
//! that is referenced again after it was already queued or processed is moved
//! to the end, so it is emitted after everything known at that point.
//!
//! ## Quick Start
//!
//! ```rust
//! use srcpp_core::MemoryFileSystem;
//! use srcpp_core::Preprocessor;
//! use srcpp_core::plugins::build_chain;
//! use std::path::PathBuf;
//!
//! let fs = MemoryFileSystem::new()
//!     .with_file("/src/main.cl", "#include \"util.cl\"\n\nkernel void main() {}\n")
//!     .with_file("/src/util.cl", "int helper();\n");
//!
//! let output = Preprocessor::new(fs)
//!     .with_plugins(build_chain(&["inc", "blr"]).unwrap())
//!     .run(&[PathBuf::from("/src/main.cl")])
//!     .unwrap();
//!
//! assert_eq!(output.merged(), "kernel void main() {}\nint helper();");
//! ```

pub use config::*;
pub use definitions::*;
pub use error::*;
pub use fs::*;
pub use manager::*;
pub use pipeline::*;
pub use plugin::*;
pub use preprocessor::*;
pub use resolution::*;
pub use script::*;
pub use settings::*;

pub mod cleanup;
pub mod config;
mod definitions;
#[allow(unused_assignments)]
mod error;
mod fs;
mod manager;
mod pipeline;
mod plugin;
pub mod plugins;
mod preprocessor;
mod resolution;
mod script;
mod settings;

#[cfg(test)]
mod __fixtures;
