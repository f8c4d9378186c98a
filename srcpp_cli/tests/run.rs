mod common;

use common::write_file;
use serde_json::Value;
use similar_asserts::assert_eq;
use srcpp_core::AnyEmptyResult;

#[test]
fn run_follows_includes_and_strips_blank_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"main.cl",
		"#include \"lib/util.cl\"\n\nkernel void k() {}\n",
	)?;
	write_file(tmp.path(), "lib/util.cl", "\nint util();\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("kernel void k() {}\nint util();\n");

	Ok(())
}

#[test]
fn run_defaults_root_to_current_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "main\n")?;

	common::srcpp_cmd()
		.current_dir(tmp.path())
		.arg("run")
		.arg("main.cl")
		.assert()
		.success()
		.stdout("main\n");

	Ok(())
}

#[test]
fn run_emits_cyclic_includes_once() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "a.cl", "#include \"b.cl\"\na body\n")?;
	write_file(tmp.path(), "b.cl", "#include \"c.cl\"\nb body\n")?;
	write_file(tmp.path(), "c.cl", "#include \"a.cl\"\nc body\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("a.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("b body\nc body\na body\n");

	Ok(())
}

#[test]
fn run_json_lists_emission_order() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "#include \"util.cl\"\nmain\n")?;
	write_file(tmp.path(), "util.cl", "util\n")?;

	let output = common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	let order: Vec<&str> = json["order"]
		.as_array()
		.map(|keys| keys.iter().filter_map(Value::as_str).collect())
		.unwrap_or_default();
	assert_eq!(order.len(), 2);
	assert!(order[0].ends_with("/main.cl"));
	assert!(order[1].ends_with("/util.cl"));

	assert_eq!(json["scripts"][0]["lines"], serde_json::json!(["main"]));
	assert_eq!(json["scripts"][1]["lines"], serde_json::json!(["util"]));

	Ok(())
}

#[test]
fn run_writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "#include \"util.cl\"\nmain\n")?;
	write_file(tmp.path(), "util.cl", "util\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--output")
		.arg("merged.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Merged 2 file(s) into merged.cl"));

	let merged = std::fs::read_to_string(tmp.path().join("merged.cl"))?;
	assert_eq!(merged, "main\nutil\n");

	Ok(())
}

#[test]
fn run_chain_flag_overrides_default_chain() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "#include \"util.cl\"\n\nmain\n")?;
	write_file(tmp.path(), "util.cl", "util\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--chain")
		.arg("inc")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("\nmain\nutil\n");

	Ok(())
}

#[test]
fn run_set_overrides_include_keyword() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "#import \"util.cl\"\nmain\n")?;
	write_file(tmp.path(), "util.cl", "util\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--set")
		.arg("inc:kw=#import")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("main\nutil\n");

	Ok(())
}

#[test]
fn run_parameterized_scheme_materializes_each_variant() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"main.cl",
		"#include tile.cl WIDTH=4\n#include tile.cl WIDTH=8\n",
	)?;
	write_file(tmp.path(), "tile.cl", "tile\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("tile\n");

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--scheme")
		.arg("parameterized")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("tile\ntile\n");

	Ok(())
}

#[test]
fn run_warns_about_missing_include() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "#include \"gone.cl\"\nmain\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("main\n")
		.stderr(predicates::str::contains("included file does not exist"));

	Ok(())
}

#[test]
fn run_fails_for_missing_input() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::srcpp_cmd()
		.arg("run")
		.arg("nope.cl")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("input file not found"));

	Ok(())
}

#[test]
fn run_fails_for_unknown_plugin() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "main\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--chain")
		.arg("inc,zzz")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("unknown plugin `zzz`"));

	Ok(())
}

#[test]
fn run_fails_for_malformed_setting() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "main\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--set")
		.arg("blr-k")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("malformed setting `blr-k`"));

	Ok(())
}

#[test]
fn run_fails_for_invalid_option_value() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "main.cl", "main\n")?;

	common::srcpp_cmd()
		.arg("run")
		.arg("main.cl")
		.arg("--set")
		.arg("blr:ss=sometime")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("invalid value `sometime`"));

	Ok(())
}

#[test]
fn run_without_inputs_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::srcpp_cmd()
		.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("no inputs given"));

	Ok(())
}

#[test]
fn missing_subcommand_exits_with_one() {
	common::srcpp_cmd()
		.assert()
		.failure()
		.code(1)
		.stderr(predicates::str::contains("No subcommand specified"));
}
