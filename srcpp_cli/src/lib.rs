use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Preprocess source files before they are handed to a compiler.",
	long_about = "srcpp follows include directives across a set of source files, runs each file \
	              through an ordered chain of plugins and prints the merged result.\n\nFiles \
	              that are included again after they were already queued are moved to the end, \
	              so the merged output lists every file after the files that reference \
	              it.\n\nQuick start:\n  srcpp run kernels/main.cl   Preprocess one file\n  \
	              srcpp plugins               List the built-in plugins and their options"
)]
pub struct SrcppCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. Relative inputs and the config file
	/// are resolved against it.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Preprocess the given inputs and print the merged result.
	///
	/// Every input is loaded, every include directive is followed and each
	/// file runs through the plugin chain. When no inputs are given, the
	/// `inputs` listed in `srcpp.toml` are used.
	Run(RunArgs),
	/// List the built-in plugins with their prefixes, defaults and options.
	Plugins {
		/// Output format for the plugin listing.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Args)]
pub struct RunArgs {
	/// Files to preprocess.
	pub inputs: Vec<PathBuf>,

	/// Write the merged result to this file instead of stdout.
	#[arg(long, short)]
	pub output: Option<PathBuf>,

	/// Output format. Use `text` for the merged source or `json` for the
	/// emission order and the lines of every file.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Plugin setting written as `<prefix>:<option>=<value>`, e.g.
	/// `blr:k=###BLANK###`. Overrides values from the config file. May be
	/// repeated.
	#[arg(long = "set", value_name = "SETTING")]
	pub settings: Vec<String>,

	/// Plugin prefixes in chain order, e.g. `--chain inc,blr`. Overrides
	/// the chain from the config file.
	#[arg(long, value_delimiter = ',')]
	pub chain: Option<Vec<String>>,

	/// Name to define before the run starts. May be repeated.
	#[arg(long = "define", short = 'D', value_name = "NAME")]
	pub definitions: Vec<String>,

	/// How include references are turned into file identities.
	#[arg(long, value_enum, default_value_t = SchemeKind::PathKey)]
	pub scheme: SchemeKind,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeKind {
	/// One identity per file path.
	PathKey,
	/// Tokens after the path become part of the identity, so `a.cl X` and
	/// `a.cl Y` are two separate files.
	Parameterized,
}
