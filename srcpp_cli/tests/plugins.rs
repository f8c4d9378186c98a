mod common;

use serde_json::Value;
use similar_asserts::assert_eq;
use srcpp_core::AnyEmptyResult;

#[test]
fn plugins_lists_builtin_plugins() {
	common::srcpp_cmd()
		.arg("plugins")
		.assert()
		.success()
		.stdout(predicates::str::contains("Includer"))
		.stdout(predicates::str::contains("BlankLineRemover"))
		.stdout(predicates::str::contains("inc, Include"))
		.stdout(predicates::str::contains("set-keyword(kw)"))
		.stdout(predicates::str::contains("set-removekeyword(k)"));
}

#[test]
fn plugins_json_describes_descriptors() -> AnyEmptyResult {
	let output = common::srcpp_cmd()
		.arg("plugins")
		.arg("--format")
		.arg("json")
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json.as_array().map(Vec::len), Some(2));

	assert_eq!(json[0]["name"], "Includer");
	assert_eq!(json[0]["prefixes"], serde_json::json!(["inc", "Include"]));
	assert_eq!(json[0]["stage"], "OnLoad");
	assert_eq!(json[0]["kind"], "FullScript");

	assert_eq!(json[1]["name"], "BlankLineRemover");
	assert_eq!(json[1]["stage"], "OnFinishUp");
	assert_eq!(json[1]["order"], "After");
	assert_eq!(
		json[1]["cleanup_tokens"],
		serde_json::json!(["###REMOVE###", "###remove###"])
	);
	assert_eq!(json[1]["options"][0]["shortcut"], "k");

	Ok(())
}
