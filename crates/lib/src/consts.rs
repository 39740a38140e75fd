//! Shared constants and defaults.

pub const APP_NAME: &str = "grafter";

/// Manifest used when none is given on the command line.
pub const DEFAULT_MANIFEST: &str = "./subgraph.yaml";

pub const DEFAULT_CONTRACT_NAME: &str = "Contract";

pub const DEFAULT_NETWORKS_FILE: &str = "./networks.json";

/// Data source kind used when the manifest has none to copy from.
pub const DEFAULT_DATA_SOURCE_KIND: &str = "ethereum/contract";

pub const MAPPING_KIND: &str = "ethereum/events";

pub const MAPPING_LANGUAGE: &str = "wasm/assemblyscript";

pub const DEFAULT_API_VERSION: &str = "0.0.7";

pub const ABIS_DIR: &str = "abis";

pub const MAPPINGS_DIR: &str = "src";

pub const TESTS_DIR: &str = "tests";

/// Overrides the block explorer API endpoint used to fetch ABIs.
pub const EXPLORER_URL_ENV: &str = "GRAFTER_EXPLORER_URL";
