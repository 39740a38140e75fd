//! ABI acquisition from block explorers.
//!
//! Explorers speak the Etherscan API: `GET <api>?module=contract&action=getabi&address=<addr>`
//! answers `{"status": "1", "message": "OK", "result": "<abi json string>"}`.
//! A `status` other than `"1"` means the contract is not verified there.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};

use super::{AbiDescriptor, AbiError};
use crate::consts::EXPLORER_URL_ENV;

/// Where to get an ABI from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiSource {
  /// A JSON file on disk.
  Local(PathBuf),
  /// The verified ABI of a deployed contract.
  Explorer { network: String, address: String },
}

impl AbiSource {
  /// Acquire the ABI and name it after `contract_name`.
  pub async fn load(&self, contract_name: &str, client: &ExplorerClient) -> Result<AbiDescriptor, AbiError> {
    match self {
      AbiSource::Local(path) => AbiDescriptor::load(contract_name, path),
      AbiSource::Explorer { network, address } => client.fetch_abi(contract_name, network, address).await,
    }
  }
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
  status: String,
  #[serde(default)]
  result: serde_json::Value,
}

/// HTTP client for Etherscan-compatible explorers.
#[derive(Debug, Clone, Default)]
pub struct ExplorerClient {
  http: reqwest::Client,
  base_url: Option<String>,
}

impl ExplorerClient {
  /// Client that picks the explorer from the network name.
  pub fn new() -> Self {
    Self::default()
  }

  /// Client that sends every request to `base_url`, whatever the network.
  pub fn with_base_url(base_url: impl Into<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: Some(base_url.into()),
    }
  }

  /// Client honoring the `GRAFTER_EXPLORER_URL` override.
  pub fn from_env() -> Self {
    match std::env::var(EXPLORER_URL_ENV) {
      Ok(url) if !url.is_empty() => Self::with_base_url(url),
      _ => Self::new(),
    }
  }

  /// The API endpoint used for `network`.
  pub fn api_url(&self, network: &str) -> String {
    match &self.base_url {
      Some(url) => url.clone(),
      None => explorer_api_url(network),
    }
  }

  /// Download the verified ABI of `address` on `network`.
  pub async fn fetch_abi(&self, contract_name: &str, network: &str, address: &str) -> Result<AbiDescriptor, AbiError> {
    let url = self.api_url(network);
    info!(network, address, url = %url, "fetching ABI from explorer");

    let network_err = |e| AbiError::Network {
      url: url.clone(),
      source: e,
    };

    let response: ExplorerResponse = self
      .http
      .get(&url)
      .query(&[("module", "contract"), ("action", "getabi"), ("address", address)])
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(network_err)?
      .json()
      .await
      .map_err(network_err)?;

    let not_found = || AbiError::NotFound {
      network: network.to_string(),
      address: address.to_string(),
    };

    if response.status != "1" {
      debug!(status = %response.status, result = %response.result, "explorer returned no ABI");
      return Err(not_found());
    }

    let abi_json = response.result.as_str().ok_or_else(not_found)?;
    let json = serde_json::from_str(abi_json).map_err(AbiError::Parse)?;
    AbiDescriptor::from_json(contract_name, json, &url)
  }
}

/// Explorer API endpoint for a network name as used in manifests.
pub fn explorer_api_url(network: &str) -> String {
  let url = match network {
    "mainnet" => "https://api.etherscan.io/api",
    "poa-core" => "https://blockscout.com/poa/core/api",
    "poa-sokol" => "https://blockscout.com/poa/sokol/api",
    "xdai" | "gnosis" => "https://api.gnosisscan.io/api",
    "arbitrum-one" => "https://api.arbiscan.io/api",
    "arbitrum-goerli" => "https://api-goerli.arbiscan.io/api",
    "bsc" => "https://api.bscscan.com/api",
    "chapel" => "https://api-testnet.bscscan.com/api",
    "matic" => "https://api.polygonscan.com/api",
    "mumbai" => "https://api-testnet.polygonscan.com/api",
    "optimism" => "https://api-optimistic.etherscan.io/api",
    "optimism-goerli" => "https://api-goerli-optimistic.etherscan.io/api",
    "fantom" => "https://api.ftmscan.com/api",
    "avalanche" => "https://api.snowtrace.io/api",
    "celo" => "https://api.celoscan.io/api",
    "moonbeam" => "https://api-moonbeam.moonscan.io/api",
    "moonriver" => "https://api-moonriver.moonscan.io/api",
    "aurora" => "https://explorer.mainnet.aurora.dev/api",
    "aurora-testnet" => "https://explorer.testnet.aurora.dev/api",
    "base" => "https://api.basescan.org/api",
    _ => return format!("https://api-{}.etherscan.io/api", network),
  };
  url.to_string()
}
