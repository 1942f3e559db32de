//! Constants used in the Diamond management scripts

/// The default manifest file
pub const DEFAULT_MANIFEST_PATH: &str = "diamond.json";

/// The default command file replayed by `diamond init`
pub const DEFAULT_DIAMOND_FILE: &str = "DIAMONDFILE";

/// The default directory holding Hardhat build artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default directory to which facet metadata is saved
pub const DEFAULT_METADATA_DIR: &str = "metadata";

/// The default command used to compile the contracts
pub const DEFAULT_BUILD_COMMAND: &str = "npx hardhat compile";

/// The default RPC URL, a local development node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// The prefix marking a comment line in the command file
pub const COMMENT_PREFIX: char = '#';

/// The shell used to run replayed and toolchain commands
pub const SHELL: &str = "sh";

/// The gas limit attached to the `diamondCut` transaction
pub const CUT_GAS_LIMIT: u64 = 10_000_000;

/// The extension of a build artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The suffix of a Hardhat debug artifact, which points at the build info
pub const DEBUG_ARTIFACT_SUFFIX: &str = ".dbg.json";

/// The number of hex characters in an address
pub const ADDRESS_HEX_LEN: usize = 40;

/// The marker that opens an unlinked library placeholder in bytecode
pub const LINK_PLACEHOLDER_MARKER: &str = "__$";

/// The Hardhat error code raised when no development node is reachable
pub const ENVIRONMENT_NOT_RUNNING_CODE: &str = "HH108";

/// Guidance printed when the development environment is not running
pub const ENVIRONMENT_NOT_RUNNING_HELP: &str = "You need to run the development environment first, \
    try running `yarn dev:start` in another terminal before running this command.";

// --- Standard facets --- //

/// The artifact name of the Diamond proxy
pub const DIAMOND_CONTRACT: &str = "Diamond";

/// The artifact name of the standard cut facet
pub const DIAMOND_CUT_FACET: &str = "DiamondCutFacet";

/// The artifact name of the standard loupe facet
pub const DIAMOND_LOUPE_FACET: &str = "DiamondLoupeFacet";

/// The artifact name of the standard ownership facet
pub const OWNERSHIP_FACET: &str = "OwnershipFacet";

/// The artifact name of the standard initializer
pub const DIAMOND_INIT: &str = "DiamondInit";

// --- Block explorer --- //

/// The explorer API module for contract endpoints
pub const EXPLORER_CONTRACT_MODULE: &str = "contract";

/// The explorer action returning a verified contract's name and ABI
pub const EXPLORER_GET_SOURCE_ACTION: &str = "getsourcecode";

/// The explorer action submitting a contract for verification
pub const EXPLORER_VERIFY_ACTION: &str = "verifysourcecode";

/// The explorer code format for standard JSON compiler input
pub const EXPLORER_STANDARD_JSON_FORMAT: &str = "solidity-standard-json-input";

/// The status the explorer reports on success
pub const EXPLORER_OK_STATUS: &str = "1";
