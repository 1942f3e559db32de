//! Loading of Hardhat build artifacts and linking of their library placeholders

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    hex,
    json_abi::JsonAbi,
    primitives::{Address, Bytes},
};
use itertools::Itertools;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{
    constants::{
        ADDRESS_HEX_LEN, ARTIFACT_EXTENSION, DEBUG_ARTIFACT_SUFFIX, LINK_PLACEHOLDER_MARKER,
    },
    errors::ScriptError,
};

/// The location of one library placeholder in a contract's bytecode
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct LinkReference {
    /// The byte offset of the placeholder
    pub start: usize,
    /// The byte length of the placeholder
    pub length: usize,
}

/// A contract artifact as written by `hardhat compile`
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardhatArtifact {
    /// The contract name
    pub contract_name: String,
    /// The source file the contract is defined in
    pub source_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, hex encoded, possibly with library placeholders
    pub bytecode: String,
    /// Source file -> library name -> placeholder locations
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>,
}

impl HardhatArtifact {
    /// Returns the creation bytecode with every library placeholder replaced by the
    /// library's address
    pub fn link(&self, libraries: &BTreeMap<String, Address>) -> Result<Bytes, ScriptError> {
        let code = self.bytecode.strip_prefix("0x").unwrap_or(&self.bytecode);
        if !code.is_ascii() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{}: bytecode is not hex",
                self.contract_name
            )));
        }
        let mut code = code.as_bytes().to_vec();

        for (source, libs) in &self.link_references {
            for (lib, references) in libs {
                let address = libraries.get(lib).ok_or_else(|| {
                    ScriptError::ArtifactParsing(format!(
                        "{}: library {source}:{lib} is not linked",
                        self.contract_name
                    ))
                })?;
                let address_hex = hex::encode(address);

                for reference in references {
                    let start = reference.start * 2;
                    let end = start + ADDRESS_HEX_LEN;
                    if reference.length * 2 != ADDRESS_HEX_LEN || end > code.len() {
                        return Err(ScriptError::ArtifactParsing(format!(
                            "{}: invalid link reference for {lib} at {}",
                            self.contract_name, reference.start
                        )));
                    }
                    code[start..end].copy_from_slice(address_hex.as_bytes());
                }
            }
        }

        let marker = LINK_PLACEHOLDER_MARKER.as_bytes();
        if code.windows(marker.len()).any(|w| w == marker) {
            return Err(ScriptError::ArtifactParsing(format!(
                "{}: bytecode has unlinked libraries",
                self.contract_name
            )));
        }

        hex::decode(&code)
            .map(Bytes::from)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", self.contract_name)))
    }
}

/// The debug file Hardhat writes beside each artifact
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugArtifact {
    /// Path of the build info, relative to the debug file
    build_info: String,
}

/// The compiler input and version a contract was built with
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// The full compiler version, e.g. `0.8.17+commit.8df45f5f`
    pub solc_long_version: String,
    /// The standard JSON input given to the compiler
    pub input: Value,
}

/// A directory of Hardhat build artifacts
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The artifacts root directory
    root: PathBuf,
}

impl ArtifactStore {
    /// Constructor
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds the artifact file of the named contract
    pub fn artifact_path(&self, name: &str) -> Result<PathBuf, ScriptError> {
        let file_name = format!("{name}.{ARTIFACT_EXTENSION}");
        let mut matches = Vec::new();
        find_files(&self.root, &file_name, &mut matches)?;

        match matches.len() {
            0 => Err(ScriptError::ArtifactParsing(format!(
                "no artifact for {name} in {}",
                self.root.display()
            ))),
            1 => Ok(matches.remove(0)),
            _ => Err(ScriptError::ArtifactParsing(format!(
                "{name} is defined in more than one source: {}",
                matches.iter().map(|path| path.display()).join(", ")
            ))),
        }
    }

    /// Loads the artifact of the named contract
    pub fn artifact(&self, name: &str) -> Result<HardhatArtifact, ScriptError> {
        read_json(&self.artifact_path(name)?)
    }

    /// Loads the build info the named contract was compiled with
    pub fn build_info(&self, name: &str) -> Result<BuildInfo, ScriptError> {
        let artifact_path = self.artifact_path(name)?;
        let debug_path = artifact_path.with_file_name(format!("{name}{DEBUG_ARTIFACT_SUFFIX}"));
        let debug: DebugArtifact = read_json(&debug_path)?;

        let dir = debug_path.parent().unwrap_or(&self.root);
        read_json(&dir.join(debug.build_info))
    }
}

/// Recursively collects the files under `dir` named exactly `file_name`, skipping
/// debug artifacts
fn find_files(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", dir.display())))?;

    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ReadFile(e.to_string()))?
            .path();
        if path.is_dir() {
            find_files(&path, file_name, found)?;
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == file_name && !name.ends_with(DEBUG_ARTIFACT_SUFFIX) {
            found.push(path);
        }
    }

    Ok(())
}

/// Reads and parses a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ReadFile(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
}
