//! A client for Etherscan-compatible block explorer APIs

use alloy::{hex, json_abi::JsonAbi, primitives::Address};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    artifacts::{BuildInfo, HardhatArtifact},
    cli::ScriptConfig,
    constants::{
        EXPLORER_CONTRACT_MODULE, EXPLORER_GET_SOURCE_ACTION, EXPLORER_OK_STATUS,
        EXPLORER_STANDARD_JSON_FORMAT, EXPLORER_VERIFY_ACTION,
    },
    errors::ScriptError,
};

/// The envelope every explorer response is wrapped in
#[derive(Debug, Deserialize)]
struct ExplorerResponse<T> {
    /// `1` on success
    status: String,
    /// A short description of the outcome
    message: String,
    /// The payload, or an error description on failure
    result: T,
}

/// The subset of a `getsourcecode` entry the scripts use
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SourceCodeEntry {
    /// The verified contract name
    contract_name: String,
    /// The ABI as a JSON string, or a notice if the contract is not verified
    #[serde(rename = "ABI")]
    abi: String,
}

/// The verified name and ABI of a deployed contract
#[derive(Clone, Debug)]
pub struct ContractMetadata {
    /// The contract name
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The full explorer entry
    pub raw: Value,
}

/// A contract to submit for verification
pub struct VerificationRequest<'a> {
    /// The deployed address
    pub address: Address,
    /// The artifact the contract was deployed from
    pub artifact: &'a HardhatArtifact,
    /// The compiler input the artifact was built with
    pub build_info: &'a BuildInfo,
    /// The ABI-encoded constructor arguments
    pub constructor_args: &'a [u8],
}

/// A client for an Etherscan-compatible explorer API
#[derive(Clone, Debug)]
pub struct ExplorerClient {
    /// The HTTP client
    http: reqwest::Client,
    /// The API endpoint
    api_url: String,
    /// The API key, if the explorer requires one
    api_key: Option<String>,
}

impl ExplorerClient {
    /// Constructor
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
        }
    }

    /// Builds a client from the script configuration, if an explorer is configured
    pub fn from_config(config: &ScriptConfig) -> Option<Self> {
        let api_url = config.explorer_api_url.as_ref()?;
        Some(Self::new(api_url.clone(), config.explorer_api_key.clone()))
    }

    /// Fetches the verified name and ABI of the contract at the given address
    pub async fn contract_metadata(&self, address: Address) -> Result<ContractMetadata, ScriptError> {
        let address = address.to_string();
        let mut params = vec![
            ("module", EXPLORER_CONTRACT_MODULE),
            ("action", EXPLORER_GET_SOURCE_ACTION),
            ("address", address.as_str()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.as_str()));
        }

        let response = self.http.get(&self.api_url).query(&params).send().await;
        let entries: Vec<Value> = parse_response(response).await?;
        let raw = entries
            .into_iter()
            .next()
            .ok_or_else(|| ScriptError::Explorer(format!("no source code for {address}")))?;

        metadata_from_entry(&address, raw)
    }

    /// Submits a contract for verification, returning the explorer's request id
    pub async fn verify(&self, request: VerificationRequest<'_>) -> Result<String, ScriptError> {
        let source = serde_json::to_string(&request.build_info.input)
            .map_err(|e| ScriptError::Explorer(e.to_string()))?;
        let address = request.address.to_string();
        let contract_name = format!(
            "{}:{}",
            request.artifact.source_name, request.artifact.contract_name
        );
        let compiler_version = format!("v{}", request.build_info.solc_long_version);
        let constructor_args = hex::encode(request.constructor_args);

        let mut form = vec![
            ("module", EXPLORER_CONTRACT_MODULE),
            ("action", EXPLORER_VERIFY_ACTION),
            ("contractaddress", address.as_str()),
            ("sourceCode", source.as_str()),
            ("codeformat", EXPLORER_STANDARD_JSON_FORMAT),
            ("contractname", contract_name.as_str()),
            ("compilerversion", compiler_version.as_str()),
            // Sic, the Etherscan API misspells this field
            ("constructorArguements", constructor_args.as_str()),
        ];
        if let Some(key) = &self.api_key {
            form.push(("apikey", key.as_str()));
        }

        debug!("submitting {contract_name} at {address} for verification");
        let response = self.http.post(&self.api_url).form(&form).send().await;
        parse_response(response).await
    }
}

/// Parses a `getsourcecode` entry, failing if the contract is not verified
fn metadata_from_entry(address: &str, raw: Value) -> Result<ContractMetadata, ScriptError> {
    let entry: SourceCodeEntry =
        serde_json::from_value(raw.clone()).map_err(|e| ScriptError::Explorer(e.to_string()))?;
    let abi: JsonAbi = serde_json::from_str(&entry.abi)
        .map_err(|_| ScriptError::Explorer(format!("{address} is not verified: {}", entry.abi)))?;

    Ok(ContractMetadata {
        name: entry.contract_name,
        abi,
        raw,
    })
}

/// Unwraps an explorer response envelope
async fn parse_response<T: DeserializeOwned>(
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<T, ScriptError> {
    let body: ExplorerResponse<Value> = response
        .map_err(|e| ScriptError::Explorer(e.to_string()))?
        .json()
        .await
        .map_err(|e| ScriptError::Explorer(e.to_string()))?;

    if body.status != EXPLORER_OK_STATUS {
        return Err(ScriptError::Explorer(format!(
            "{}: {}",
            body.message, body.result
        )));
    }

    serde_json::from_value(body.result).map_err(|e| ScriptError::Explorer(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_metadata_from_verified_entry() {
        let raw = json!({
            "SourceCode": "",
            "ABI": r#"[{"type":"function","name":"owner","stateMutability":"view","inputs":[],"outputs":[{"name":"","type":"address"}]}]"#,
            "ContractName": "OwnershipFacet",
            "CompilerVersion": "v0.8.17+commit.8df45f5f"
        });

        let metadata = metadata_from_entry("0x01", raw).unwrap();
        assert_eq!(metadata.name, "OwnershipFacet");
        assert_eq!(metadata.abi.functions().count(), 1);
        assert_eq!(metadata.raw["CompilerVersion"], "v0.8.17+commit.8df45f5f");
    }

    #[test]
    fn test_metadata_from_unverified_entry() {
        let raw = json!({
            "SourceCode": "",
            "ABI": "Contract source code not verified",
            "ContractName": ""
        });

        let err = metadata_from_entry("0x01", raw).unwrap_err();
        assert!(err.to_string().contains("not verified"));
    }
}
