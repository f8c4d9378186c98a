use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SrcppError {
	#[error(transparent)]
	#[diagnostic(code(srcpp::io_error))]
	Io(#[from] std::io::Error),

	#[error("input file not found: `{0}`")]
	#[diagnostic(
		code(srcpp::missing_input),
		help("check the path passed to `srcpp run` or the `inputs` list in srcpp.toml")
	)]
	MissingInput(String),

	#[error("input reference could not be resolved: `{0}`")]
	#[diagnostic(code(srcpp::unresolved_input))]
	UnresolvedInput(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(srcpp::config_parse),
		help("check that srcpp.toml is valid TOML with `chain` and [settings.<prefix>] tables")
	)]
	ConfigParse(String),

	#[error("unknown plugin `{0}` in chain")]
	#[diagnostic(
		code(srcpp::unknown_plugin),
		help("run `srcpp plugins` to list the available plugin prefixes")
	)]
	UnknownPlugin(String),

	#[error("unknown option `{option}` for plugin `{prefix}`")]
	#[diagnostic(
		code(srcpp::unknown_option),
		help("run `srcpp plugins` to list the options each plugin accepts")
	)]
	UnknownOption { prefix: String, option: String },

	#[error("invalid value `{value}` for option `{option}`: {reason}")]
	#[diagnostic(code(srcpp::invalid_option_value))]
	InvalidOptionValue {
		option: String,
		value: String,
		reason: String,
	},

	#[error("malformed setting `{0}`")]
	#[diagnostic(
		code(srcpp::malformed_setting),
		help("settings are written as `<prefix>:<option>=<value>`")
	)]
	MalformedSetting(String),

	#[error("invalid file pattern `{pattern}`: {reason}")]
	#[diagnostic(code(srcpp::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },
}

pub type SrcppResult<T> = Result<T, SrcppError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
