//! Subgraph management on a Fura graph node.
//!
//! The node speaks JSON-RPC over HTTP: every call is a `POST` of
//! `{"jsonrpc": "2.0", "id": <n>, "method": "subgraph_<op>", "params": {...}}`
//! to the node URL, authenticated with `Authorization: Bearer <access token>`.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

/// Errors returned by the node or raised before a request is sent.
#[derive(Debug, Error)]
pub enum FuraError {
  #[error("graph node \"{node}\" is invalid: {reason}")]
  InvalidNodeUrl { node: String, reason: String },

  /// The request failed or the node answered with a non-success status.
  #[error("HTTP error {} the subgraph: {source}", .method.action())]
  Http {
    method: FuraMethod,
    #[source]
    source: reqwest::Error,
  },

  /// The node rejected the call.
  #[error("error {} the subgraph: {message}", .method.action())]
  Rpc {
    method: FuraMethod,
    code: i64,
    message: String,
  },

  #[error("unexpected {} response: {reason}", .method.rpc_name())]
  InvalidResponse { method: FuraMethod, reason: String },
}

/// The subgraph operations a node exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuraMethod {
  List,
  Info,
  Submit,
  Revoke,
}

impl FuraMethod {
  pub fn rpc_name(self) -> &'static str {
    match self {
      FuraMethod::List => "subgraph_list",
      FuraMethod::Info => "subgraph_info",
      FuraMethod::Submit => "subgraph_submit",
      FuraMethod::Revoke => "subgraph_revoke",
    }
  }

  fn action(self) -> &'static str {
    match self {
      FuraMethod::List => "listing",
      FuraMethod::Info => "getting",
      FuraMethod::Submit => "deploying",
      FuraMethod::Revoke => "revoking",
    }
  }
}

/// Endpoints of a freshly submitted subgraph version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Deployment {
  pub playground: String,
  pub queries: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
  #[serde(default)]
  result: Option<Value>,
  #[serde(default)]
  error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
  #[serde(default)]
  code: i64,
  message: String,
}

/// Check that `node` is an absolute http(s) URL with a host.
pub fn validate_node_url(node: &str) -> Result<Url, FuraError> {
  let invalid = |reason: String| FuraError::InvalidNodeUrl {
    node: node.to_string(),
    reason,
  };

  let url = Url::parse(node).map_err(|e| invalid(e.to_string()))?;
  if !matches!(url.scheme(), "http" | "https") {
    return Err(invalid(format!(
      "unsupported protocol {}, expected http or https",
      url.scheme()
    )));
  }
  if url.host_str().is_none_or(str::is_empty) {
    return Err(invalid("no host given".to_string()));
  }
  Ok(url)
}

/// JSON-RPC client bound to one node and access token.
#[derive(Debug)]
pub struct FuraClient {
  http: reqwest::Client,
  node: Url,
  access_token: String,
  next_id: AtomicU64,
}

impl FuraClient {
  pub fn new(node: &str, access_token: impl Into<String>) -> Result<Self, FuraError> {
    Ok(Self {
      http: reqwest::Client::new(),
      node: validate_node_url(node)?,
      access_token: access_token.into(),
      next_id: AtomicU64::new(1),
    })
  }

  pub fn node(&self) -> &Url {
    &self.node
  }

  /// Subgraphs owned by the access token.
  pub async fn list(&self) -> Result<Value, FuraError> {
    self.call(FuraMethod::List, json!({ "name": "*" })).await
  }

  pub async fn info(&self, name: &str) -> Result<Value, FuraError> {
    self.call(FuraMethod::Info, json!({ "name": name })).await
  }

  /// Deploy an uploaded build as a new version of `name`.
  ///
  /// Endpoints the node returns as a bare `:port/path` are completed with the
  /// scheme and host of the node URL.
  pub async fn submit(&self, name: &str, ipfs_hash: &str, version_label: &str) -> Result<Deployment, FuraError> {
    let params = json!({ "name": name, "ipfs_hash": ipfs_hash, "version_label": version_label });
    let result = self.call(FuraMethod::Submit, params).await?;

    let deployment: Deployment = serde_json::from_value(result).map_err(|e| FuraError::InvalidResponse {
      method: FuraMethod::Submit,
      reason: e.to_string(),
    })?;
    Ok(Deployment {
      playground: self.absolute_endpoint(deployment.playground),
      queries: self.absolute_endpoint(deployment.queries),
    })
  }

  pub async fn revoke(&self, name: &str) -> Result<(), FuraError> {
    self.call(FuraMethod::Revoke, json!({ "name": name })).await?;
    Ok(())
  }

  fn absolute_endpoint(&self, endpoint: String) -> String {
    if endpoint.starts_with(':') {
      format!(
        "{}://{}{}",
        self.node.scheme(),
        self.node.host_str().unwrap_or_default(),
        endpoint
      )
    } else {
      endpoint
    }
  }

  async fn call(&self, method: FuraMethod, params: Value) -> Result<Value, FuraError> {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    info!(method = method.rpc_name(), node = %self.node, "sending request to graph node");

    let request = json!({
      "jsonrpc": "2.0",
      "id": id,
      "method": method.rpc_name(),
      "params": params,
    });
    let response = self
      .http
      .post(self.node.clone())
      .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
      .json(&request)
      .send()
      .await
      .map_err(|source| FuraError::Http { method, source })?;

    let status_error = response.error_for_status_ref().err();
    let body = response.json::<RpcResponse>().await;
    debug!(method = method.rpc_name(), ok = body.is_ok(), "graph node answered");

    match (body, status_error) {
      (Ok(RpcResponse { error: Some(error), .. }), _) => Err(FuraError::Rpc {
        method,
        code: error.code,
        message: error.message,
      }),
      (_, Some(source)) | (Err(source), None) => Err(FuraError::Http { method, source }),
      (Ok(RpcResponse { result, .. }), None) => Ok(result.unwrap_or(Value::Null)),
    }
  }
}
