//! Definitions of CLI arguments and commands for the Diamond management scripts

use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::{
    commands::{add::add, cut::cut, deploy::deploy, init::init, remove::remove, status::status},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_BUILD_COMMAND, DEFAULT_DIAMOND_FILE, DEFAULT_MANIFEST_PATH,
        DEFAULT_METADATA_DIR, DEFAULT_RPC_URL,
    },
    errors::ScriptError,
};

/// Manage an EIP-2535 Diamond from a local manifest
#[derive(Parser)]
#[command(name = "diamond", version)]
pub struct Cli {
    /// Configuration shared by every command
    #[command(flatten)]
    pub config: ScriptConfig,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Configuration shared by every command
#[derive(Args, Clone)]
pub struct ScriptConfig {
    /// Network RPC URL
    #[arg(long, env = "RPC_URL", default_value = DEFAULT_RPC_URL, global = true)]
    pub rpc_url: String,

    /// Private key of the account sending transactions
    #[arg(long, env = "PKEY", hide_env_values = true, global = true)]
    pub priv_key: Option<String>,

    /// Path to the manifest file
    #[arg(short = 'o', long, default_value = DEFAULT_MANIFEST_PATH, global = true)]
    pub manifest: PathBuf,

    /// Directory holding the Hardhat build artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR, global = true)]
    pub artifacts_dir: PathBuf,

    /// Command used to compile the contracts
    #[arg(long, default_value = DEFAULT_BUILD_COMMAND, global = true)]
    pub build_cmd: String,

    /// Use the artifacts on disk without compiling first
    #[arg(long, global = true)]
    pub skip_build: bool,

    /// Base URL of an Etherscan-compatible explorer API
    #[arg(long, env = "EXPLORER_API_URL", global = true)]
    pub explorer_api_url: Option<String>,

    /// API key for the explorer
    #[arg(long, env = "EXPLORER_API_KEY", hide_env_values = true, global = true)]
    pub explorer_api_key: Option<String>,

    /// Directory to which `add --save-metadata` writes facet metadata
    #[arg(long, default_value = DEFAULT_METADATA_DIR, global = true)]
    pub metadata_dir: PathBuf,
}

/// The available commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy a new Diamond along with the standard facets
    Deploy(DeployArgs),
    /// Compare the manifest with the deployed Diamond
    Status(StatusArgs),
    /// Add a facet and its functions to the manifest
    Add(AddArgs),
    /// Remove a facet's functions from the manifest
    Remove(RemoveArgs),
    /// Bring the deployed Diamond in line with the manifest
    Cut(CutArgs),
    /// Build a manifest by replaying a command file
    Init(InitArgs),
}

impl Command {
    /// Runs the command
    pub async fn run(self, config: &ScriptConfig) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => deploy(args, config).await,
            Command::Status(args) => status(args, config).await,
            Command::Add(args) => add(args, config).await,
            Command::Remove(args) => remove(args, config),
            Command::Cut(args) => cut(args, config).await,
            Command::Init(args) => init(args, config),
        }
    }
}

/// Deploy the Diamond proxy.
///
/// Each standard facet is deployed from its artifact unless an existing
/// deployment is given.
#[derive(Args)]
pub struct DeployArgs {
    /// Address of an existing `DiamondCutFacet`
    #[arg(long)]
    pub diamond_cut_facet: Option<Address>,

    /// Address of an existing `DiamondLoupeFacet`
    #[arg(long)]
    pub diamond_loupe_facet: Option<Address>,

    /// Address of an existing `OwnershipFacet`
    #[arg(long)]
    pub ownership_facet: Option<Address>,

    /// Address of an existing `DiamondInit`
    #[arg(long)]
    pub diamond_init: Option<Address>,
}

/// Print the changes a cut would make
#[derive(Args)]
pub struct StatusArgs {
    /// Address of the Diamond, defaults to the one in the manifest
    #[arg(long)]
    pub address: Option<Address>,
}

/// Add a facet to the manifest
#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["remote", "local"])))]
pub struct AddArgs {
    /// Add a facet that is already deployed
    #[arg(long, requires = "address")]
    pub remote: bool,

    /// Add a facet that is built from the local artifacts
    #[arg(long, requires = "name")]
    pub local: bool,

    /// Address of the remote facet
    #[arg(long)]
    pub address: Option<Address>,

    /// Name of the facet
    #[arg(long)]
    pub name: Option<String>,

    /// Libraries to link into a local facet
    #[arg(long, value_delimiter = ',')]
    pub links: Vec<String>,

    /// ABI file for a remote facet, used instead of the explorer
    #[arg(long, requires = "name")]
    pub abi: Option<PathBuf>,

    /// Only record the contract, without its functions
    #[arg(long)]
    pub skip_functions: bool,

    /// Save the explorer metadata of a remote facet
    #[arg(long)]
    pub save_metadata: bool,
}

/// Remove a facet's functions from the manifest
#[derive(Args)]
pub struct RemoveArgs {
    /// Name of the facet
    #[arg(long)]
    pub name: String,
}

/// Deploy new facets and cut them into the Diamond
#[derive(Args)]
pub struct CutArgs {
    /// Address of the Diamond, defaults to the one in the manifest
    #[arg(long)]
    pub address: Option<Address>,

    /// Contract whose function is delegate-called after the cut
    #[arg(long, requires = "init_fn")]
    pub init_contract: Option<String>,

    /// Name or signature of the function to call on the init contract
    #[arg(long, requires = "init_contract")]
    pub init_fn: Option<String>,

    /// Arguments of the init function, as a JSON array
    #[arg(long, requires = "init_fn")]
    pub init_params: Option<String>,
}

/// Replay a command file to build a manifest
#[derive(Args)]
pub struct InitArgs {
    /// The command file to replay
    #[arg(long, default_value = DEFAULT_DIAMOND_FILE)]
    pub diamondfile: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_rejects_remote_and_local() {
        let res = Cli::try_parse_from([
            "diamond",
            "add",
            "--remote",
            "--local",
            "--name",
            "Facet",
            "--address",
            "0x0000000000000000000000000000000000000001",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_add_local_parses_links() {
        let cli = Cli::try_parse_from([
            "diamond", "add", "--local", "--name", "Facet", "--links", "LibA,LibB", "-o", "d.json",
        ])
        .unwrap();

        assert_eq!(cli.config.manifest, PathBuf::from("d.json"));
        let Command::Add(args) = cli.command else {
            panic!("expected the add command");
        };
        assert!(args.local);
        assert_eq!(args.links, vec!["LibA".to_string(), "LibB".to_string()]);
    }

    #[test]
    fn test_add_abi_requires_name() {
        let res = Cli::try_parse_from([
            "diamond",
            "add",
            "--remote",
            "--address",
            "0x0000000000000000000000000000000000000001",
            "--abi",
            "Facet.json",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_init_params_require_init_fn() {
        let res = Cli::try_parse_from(["diamond", "cut", "--init-params", "[]"]);
        assert!(res.is_err());
    }
}
