use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use srcpp_cli::Commands;
use srcpp_cli::OutputFormat;
use srcpp_cli::RunArgs;
use srcpp_cli::SchemeKind;
use srcpp_cli::SrcppCli;
use srcpp_core::DiskFileSystem;
use srcpp_core::PreprocessOutput;
use srcpp_core::Preprocessor;
use srcpp_core::ResolutionScheme;
use srcpp_core::SrcppConfig;
use srcpp_core::plugins::build_chain;
use srcpp_core::plugins::builtin_plugins;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "SRCPP_LOG";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SrcppCli::parse();

	// Respect NO_COLOR, --no-color and terminals without color support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Run(run)) => run_preprocess(&args, run),
		Some(Commands::Plugins { format }) => run_plugins(*format),
		None => {
			eprintln!("No subcommand specified. Run `srcpp --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<srcpp_core::SrcppError>() {
			Ok(srcpp_err) => {
				let report: miette::Report = (*srcpp_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `SRCPP_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("srcpp_core=debug,warn")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn resolve_root(args: &SrcppCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("  {label:<16} {value}");
}

fn run_preprocess(args: &SrcppCli, run: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = SrcppConfig::load(&root)?.unwrap_or_default();

	let mut settings = config.settings();
	for entry in &run.settings {
		settings.set_entry(entry)?;
	}

	let chain = run.chain.clone().unwrap_or_else(|| config.chain());

	let mut definitions = config.definitions();
	for name in &run.definitions {
		definitions.define(name.as_str());
	}

	let inputs: Vec<PathBuf> = if run.inputs.is_empty() {
		config.inputs(&root)
	} else {
		run.inputs.iter().map(|input| root.join(input)).collect()
	};
	if inputs.is_empty() {
		return Err("no inputs given and none configured in srcpp.toml".into());
	}

	let mut preprocessor = Preprocessor::new(DiskFileSystem)
		.with_plugins(build_chain(chain.as_slice())?)
		.with_settings(settings)
		.with_definitions(definitions)
		.with_separator(config.separator.as_str())
		.with_base_dir(&root);
	if run.scheme == SchemeKind::Parameterized {
		preprocessor = preprocessor.with_scheme(ResolutionScheme::parameterized());
	}

	let output = preprocessor.run(&inputs)?;

	if args.verbose {
		eprintln!("Emission order:");
		for key in output.order() {
			eprintln!("  {key}");
		}
	}

	let rendered = render_output(&output, run.format)?;
	match &run.output {
		Some(path) => {
			let path = root.join(path);
			std::fs::write(&path, rendered)?;
			println!(
				"{} {} file(s) into {}",
				colored!("Merged", green),
				output.scripts.len(),
				make_relative(&path, &root)
			);
		}
		None => print!("{rendered}"),
	}

	Ok(())
}

fn render_output(
	output: &PreprocessOutput,
	format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
	match format {
		OutputFormat::Text => {
			let mut merged = output.merged();
			if !merged.is_empty() {
				merged.push('\n');
			}
			Ok(merged)
		}
		OutputFormat::Json => {
			let value = serde_json::json!({
				"order": output.order(),
				"scripts": output.scripts,
			});
			Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
		}
	}
}

fn run_plugins(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let plugins = builtin_plugins();

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = plugins
				.iter()
				.map(|plugin| {
					let descriptor = plugin.descriptor();
					serde_json::json!({
						"name": plugin.name(),
						"prefixes": descriptor.prefixes,
						"kind": plugin.kind(),
						"order": descriptor.order,
						"stage": descriptor.stage,
						"cleanup_tokens": descriptor.cleanup_tokens,
						"options": plugin.options(),
					})
				})
				.collect();
			println!("{}", serde_json::to_string_pretty(&entries)?);
		}
		OutputFormat::Text => {
			for plugin in &plugins {
				let descriptor = plugin.descriptor();
				print_section(plugin.name());
				print_field("prefixes", descriptor.prefixes.join(", "));
				print_field("kind", format!("{:?}", plugin.kind()));
				print_field("stage", descriptor.stage);
				print_field("order", descriptor.order);
				println!("  options:");
				for option in plugin.options() {
					println!("    {option}");
				}
			}
		}
	}

	Ok(())
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
