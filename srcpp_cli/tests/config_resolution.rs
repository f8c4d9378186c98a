mod common;

use common::write_file;
use rstest::rstest;
use srcpp_core::AnyEmptyResult;

#[rstest]
#[case::root("srcpp.toml")]
#[case::dotfile(".srcpp.toml")]
#[case::config_dir(".config/srcpp.toml")]
fn run_reads_inputs_from_config(#[case] config_file: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), config_file, "inputs = [\"src/main.cl\"]\n")?;
	write_file(tmp.path(), "src/main.cl", "main\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("main\n");

	Ok(())
}

#[test]
fn run_prefers_srcpp_toml_over_other_candidates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "srcpp.toml", "inputs = [\"a.cl\"]\n")?;
	write_file(tmp.path(), ".srcpp.toml", "inputs = [\"b.cl\"]\n")?;
	write_file(tmp.path(), ".config/srcpp.toml", "inputs = [\"b.cl\"]\n")?;
	write_file(tmp.path(), "a.cl", "a\n")?;
	write_file(tmp.path(), "b.cl", "b\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("a\n");

	Ok(())
}

#[test]
fn config_chain_and_settings_apply() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"srcpp.toml",
		"chain = [\"inc\"]\n\n[settings.inc]\nkw = \"#import\"\n",
	)?;
	write_file(tmp.path(), "main.cl", "#import \"util.cl\"\n\nmain\n")?;
	write_file(tmp.path(), "util.cl", "util\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("\nmain\nutil\n");

	Ok(())
}

#[test]
fn command_line_overrides_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"srcpp.toml",
		"chain = [\"inc\"]\n\n[settings.inc]\nkw = \"#import\"\n",
	)?;
	write_file(tmp.path(), "main.cl", "#use \"util.cl\"\n\nmain\n")?;
	write_file(tmp.path(), "util.cl", "util\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--chain")
		.arg("inc,blr")
		.arg("--set")
		.arg("inc:kw=#use")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("main\nutil\n");

	Ok(())
}

#[test]
fn invalid_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "srcpp.toml", "chain = 3\n")?;
	write_file(tmp.path(), "main.cl", "main\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn unknown_option_in_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "srcpp.toml", "[settings.blr]\ncolor = \"red\"\n")?;
	write_file(tmp.path(), "main.cl", "main\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("unknown option `color` for plugin `blr`"));

	Ok(())
}
