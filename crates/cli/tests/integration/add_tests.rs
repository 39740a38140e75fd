//! `grafter add` scenarios: rename, merge, fatal collisions and post-write steps.

use predicates::prelude::*;

use super::common::{ADDRESS, TestEnv};

#[test]
fn add_renames_colliding_events() {
  let env = TestEnv::new();

  env
    .add(&[])
    .assert()
    .success()
    .stdout(predicate::str::contains("TokenTransfer"))
    .stdout(predicate::str::contains("Added data source Token on goerli"));

  let manifest = env.manifest();
  let added = &manifest["dataSources"][1];
  assert_eq!(added["name"].as_str(), Some("Token"));
  assert_eq!(added["network"].as_str(), Some("goerli"));
  assert_eq!(added["source"]["address"].as_str(), Some(ADDRESS));
  assert_eq!(added["source"]["abi"].as_str(), Some("Token"));
  assert_eq!(added["mapping"]["entities"][0].as_str(), Some("TokenTransfer"));
  assert_eq!(added["mapping"]["entities"][1].as_str(), Some("Approval"));
  assert_eq!(
    added["mapping"]["eventHandlers"][0]["event"].as_str(),
    Some("TokenTransfer(indexed address,indexed address,uint256)")
  );
  assert_eq!(added["mapping"]["file"].as_str(), Some("./src/token.ts"));

  let abi: serde_json::Value = serde_json::from_str(&env.read("abis/Token.json")).unwrap();
  assert_eq!(abi[0]["name"], "TokenTransfer");
  assert_eq!(abi[2]["name"], "approve");

  let schema = env.read("schema.graphql");
  assert!(schema.starts_with("type Gravatar @entity {"));
  assert!(schema.contains("type TokenTransfer @entity(immutable: true)"));
  assert!(schema.contains("type Approval @entity(immutable: true)"));

  assert!(env.read("src/token.ts").contains("export function handleTokenTransfer"));
  assert!(env.read("tests/token-utils.ts").contains("createApprovalEvent"));
  assert_eq!(env.networks()["goerli"]["Token"]["address"], ADDRESS);
}

#[test]
fn add_keeps_existing_manifest_content() {
  let env = TestEnv::new();

  env.add(&[]).assert().success();

  let manifest = env.manifest();
  assert_eq!(manifest["dataSources"][0]["source"]["startBlock"].as_u64(), Some(6175244));
  assert_eq!(manifest["schema"]["file"].as_str(), Some("./schema.graphql"));
  assert_eq!(manifest["specVersion"].as_str(), Some("0.0.5"));
}

#[test]
fn add_merges_entities() {
  let env = TestEnv::new();

  env
    .add(&["--merge-entities"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Merged event Transfer"));

  let manifest = env.manifest();
  let entities = manifest["dataSources"][1]["mapping"]["entities"].as_sequence().unwrap();
  assert_eq!(entities.len(), 1);
  assert_eq!(entities[0].as_str(), Some("Approval"));
  assert_eq!(env.read("schema.graphql").matches("type Transfer ").count(), 1);
  assert!(!env.read("src/token.ts").contains("handleTransfer"));
}

#[test]
fn add_merging_every_event_shares_mapping() {
  let env = TestEnv::new();

  env
    .grafter()
    .args(["add", ADDRESS, "--abi", "MergeOnly.json", "--contract-name", "Mirror"])
    .args(["--merge-entities", "--skip-codegen"])
    .assert()
    .success();

  let manifest = env.manifest();
  let added = &manifest["dataSources"][1];
  assert_eq!(added["mapping"], manifest["dataSources"][0]["mapping"]);
  assert_eq!(added["source"]["abi"].as_str(), Some("Gravity"));
  assert_eq!(added["source"]["address"].as_str(), Some(ADDRESS));
}

#[test]
fn add_uses_network_flag() {
  let env = TestEnv::new();

  env.add(&["--network", "mainnet"]).assert().success();

  assert_eq!(env.manifest()["dataSources"][1]["network"].as_str(), Some("mainnet"));
  assert_eq!(env.networks()["mainnet"]["Token"]["address"], ADDRESS);
}

#[test]
fn add_with_explicit_manifest_path_writes_next_to_it() {
  let env = TestEnv::new();
  env.write_file("project/subgraph.yaml", &env.read("subgraph.yaml"));
  env.write_file("project/schema.graphql", &env.read("schema.graphql"));

  env
    .grafter()
    .args(["add", ADDRESS, "project/subgraph.yaml", "--abi", "Token.json"])
    .args(["--contract-name", "Token", "--skip-codegen"])
    .assert()
    .success();

  assert!(env.path("project/abis/Token.json").exists());
  assert!(env.path("project/src/token.ts").exists());
  assert!(env.read("project/schema.graphql").contains("type TokenTransfer"));
  assert!(env.path("networks.json").exists());
  assert!(!env.path("abis").exists());
}

#[test]
fn add_updates_existing_networks_file() {
  let env = TestEnv::new();
  env.write_file(
    "networks.json",
    r#"{"goerli": {"Gravity": {"address": "0x2E645469f354BB4F5c8a05B3b30A929361cf77eC"}}}"#,
  );

  env.add(&[]).assert().success();

  let networks = env.networks();
  assert_eq!(
    networks["goerli"]["Gravity"]["address"],
    "0x2E645469f354BB4F5c8a05B3b30A929361cf77eC"
  );
  assert_eq!(networks["goerli"]["Token"]["address"], ADDRESS);
}

#[test]
fn fatal_collision_exits_without_writing() {
  let env = TestEnv::new();
  let manifest = env
    .read("subgraph.yaml")
    .replace("        - Transfer\n", "        - Transfer\n        - TokenTransfer\n");
  env.write_file("subgraph.yaml", &manifest);
  let schema = env.read("schema.graphql");

  env
    .add(&[])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Contract name ('Token') + event name ('Transfer')"))
    .stderr(predicate::str::contains("--merge-entities"));

  assert_eq!(env.read("subgraph.yaml"), manifest);
  assert_eq!(env.read("schema.graphql"), schema);
  assert!(!env.path("abis").exists());
  assert!(!env.path("networks.json").exists());
}

#[test]
fn duplicate_contract_name_exits_with_error() {
  let env = TestEnv::new();

  env
    .grafter()
    .args(["add", ADDRESS, "--abi", "Token.json", "--contract-name", "Gravity", "--skip-codegen"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains(
      "Datasource or template with name Gravity already exists",
    ));

  assert_eq!(env.manifest()["dataSources"].as_sequence().unwrap().len(), 1);
}

#[test]
fn missing_package_manager_exits_after_manifest_write() {
  let env = TestEnv::new();
  let empty_bin = tempfile::TempDir::new().unwrap();

  env
    .grafter()
    .args(["add", ADDRESS, "--abi", "Token.json", "--contract-name", "Token"])
    .env("PATH", empty_bin.path())
    .assert()
    .code(1)
    .stderr(predicate::str::contains("neither yarn nor npm"));

  assert_eq!(env.manifest()["dataSources"].as_sequence().unwrap().len(), 2);
  assert!(env.path("networks.json").exists());
}

#[test]
#[cfg(unix)]
fn failing_codegen_is_a_warning() {
  use std::os::unix::fs::PermissionsExt;

  let env = TestEnv::new();
  let bin = tempfile::TempDir::new().unwrap();
  let yarn = bin.path().join("yarn");
  std::fs::write(&yarn, "#!/bin/sh\necho 'codegen exploded' >&2\nexit 2\n").unwrap();
  std::fs::set_permissions(&yarn, std::fs::Permissions::from_mode(0o755)).unwrap();

  env
    .grafter()
    .args(["add", ADDRESS, "--abi", "Token.json", "--contract-name", "Token"])
    .env("PATH", bin.path())
    .assert()
    .success()
    .stderr(predicate::str::contains("Code generation failed"));

  assert_eq!(env.manifest()["dataSources"][1]["name"].as_str(), Some("Token"));
}

#[test]
fn unreachable_explorer_exits_with_error() {
  let env = TestEnv::new();
  let manifest = env.read("subgraph.yaml");

  env
    .grafter()
    .args(["add", ADDRESS, "--contract-name", "Token", "--skip-codegen"])
    .env("GRAFTER_EXPLORER_URL", "http://127.0.0.1:9/api")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("failed to fetch ABI"));

  assert_eq!(env.read("subgraph.yaml"), manifest);
}
