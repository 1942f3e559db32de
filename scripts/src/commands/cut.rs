//! Brings a deployed Diamond in line with the manifest

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::{Function, JsonAbi},
    primitives::{Address, Bytes},
};
use diamond_core::{cut::build_cut, manifest::Manifest, reconciler::Reconciler};
use serde_json::Value;
use tracing::info;

use crate::{
    cli::{CutArgs, ScriptConfig},
    commands::{DeployedContract, TaskContext},
    errors::ScriptError,
    toolchain::compile,
    utils::{diamond_address, fetch_remote_state, send_cut},
};

/// A function to delegate-call on an initializer contract after the cut
#[derive(Clone, Debug)]
pub struct InitCall {
    /// The artifact name of the initializer contract
    pub contract: String,
    /// The name or signature of the function
    pub function: String,
    /// The arguments, as a JSON array
    pub params: Option<String>,
}

impl InitCall {
    /// Reads the initializer options, if any were given
    pub fn from_args(args: &CutArgs) -> Option<Self> {
        Some(Self {
            contract: args.init_contract.clone()?,
            function: args.init_fn.clone()?,
            params: args.init_params.clone(),
        })
    }
}

/// Deploys the facets the manifest introduces and cuts them into the Diamond
pub async fn cut(args: CutArgs, config: &ScriptConfig) -> Result<(), ScriptError> {
    let manifest = Manifest::load(&config.manifest)?;
    let diamond = diamond_address(args.address, &manifest)?;

    compile(config)?;
    let ctx = TaskContext::new(config)?;
    run_cut(&ctx, diamond, manifest, InitCall::from_args(&args)).await
}

/// Reconciles the Diamond with the manifest, then records the newly deployed
/// facets in the manifest.
///
/// The manifest file is only written once the cut has succeeded.
pub async fn run_cut(
    ctx: &TaskContext<'_>,
    diamond: Address,
    mut manifest: Manifest,
    init: Option<InitCall>,
) -> Result<(), ScriptError> {
    info!("louping diamond at {diamond:#x}");
    let remote =
        fetch_remote_state(&ctx.client, diamond, &manifest, ctx.explorer.as_ref()).await?;
    let local = manifest.to_state()?;
    let reconciler = Reconciler::new(&remote, &local);
    let diff = reconciler.diff();

    if diff.is_empty() && init.is_none() {
        info!("diamond is up to date");
        return Ok(());
    }

    let mut deployed = Vec::with_capacity(diff.deploy.len());
    for facet in &diff.deploy {
        deployed.push(ctx.deploy_contract(&facet.name, &facet.links, Bytes::new()).await?);
    }
    ctx.verify_contracts(&deployed).await;

    let deployed_addresses: Vec<(String, Address)> = deployed
        .iter()
        .map(|contract| (contract.name.clone(), contract.address))
        .collect();
    let addresses = reconciler.resolve_addresses(&deployed_addresses);
    let entries = build_cut(&diff, &addresses, &remote)?;

    let (init_address, calldata) = match &init {
        Some(init) => {
            let (address, calldata, contract) = prepare_init(ctx, &manifest, init).await?;
            if let Some(contract) = contract {
                manifest.mark_deployed(&contract.name, contract.address);
            }
            (address, calldata)
        }
        None => (Address::ZERO, Bytes::new()),
    };

    info!("cutting {} entries into the diamond", entries.len());
    let tx_hash = send_cut(&ctx.client, diamond, &entries, init_address, calldata).await?;

    for (name, address) in deployed_addresses {
        manifest.mark_deployed(&name, address);
    }
    manifest.save(&ctx.config.manifest)?;
    info!("diamond cut complete in {tx_hash:#x}");

    Ok(())
}

/// Resolves the initializer's address and encodes its call.
///
/// An initializer recorded in the manifest with an address is reused, otherwise
/// it is deployed and verified, and returned so it can be recorded.
async fn prepare_init(
    ctx: &TaskContext<'_>,
    manifest: &Manifest,
    init: &InitCall,
) -> Result<(Address, Bytes, Option<DeployedContract>), ScriptError> {
    let abi = ctx.artifacts.artifact(&init.contract)?.abi;
    let calldata = encode_init_call(&abi, &init.function, init.params.as_deref())?;

    let recorded = manifest
        .contracts
        .get(&init.contract)
        .and_then(|facet| facet.address);
    if let Some(address) = recorded {
        info!("reusing {} at {address:#x}", init.contract);
        return Ok((address, calldata, None));
    }

    let contract = ctx
        .deploy_contract(&init.contract, &[], Bytes::new())
        .await?;
    ctx.verify_contracts(std::slice::from_ref(&contract)).await;

    Ok((contract.address, calldata, Some(contract)))
}

/// ABI-encodes a call to the named function, coercing each JSON parameter to the
/// function's declared input type
pub fn encode_init_call(
    abi: &JsonAbi,
    function: &str,
    params: Option<&str>,
) -> Result<Bytes, ScriptError> {
    let function = find_function(abi, function)?;
    let params: Vec<Value> = match params {
        Some(params) => serde_json::from_str(params)
            .map_err(|e| ScriptError::CalldataConstruction(format!("invalid init params: {e}")))?,
        None => Vec::new(),
    };

    if params.len() != function.inputs.len() {
        return Err(ScriptError::CalldataConstruction(format!(
            "{} takes {} arguments, got {}",
            function.signature(),
            function.inputs.len(),
            params.len()
        )));
    }

    let values = function
        .inputs
        .iter()
        .zip(&params)
        .map(|(input, param)| {
            let ty = input
                .resolve()
                .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
            coerce_json(&ty, param)
        })
        .collect::<Result<Vec<_>, _>>()?;

    function
        .abi_encode_input(&values)
        .map(Bytes::from)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// Finds a function by full signature, or by name if it is not overloaded
fn find_function<'a>(
    abi: &'a JsonAbi,
    name_or_signature: &str,
) -> Result<&'a Function, ScriptError> {
    if name_or_signature.contains('(') {
        return abi
            .functions()
            .find(|f| f.signature() == name_or_signature)
            .ok_or_else(|| {
                ScriptError::CalldataConstruction(format!("no function {name_or_signature}"))
            });
    }

    match abi.function(name_or_signature).map(Vec::as_slice) {
        Some([function]) => Ok(function),
        Some(_) => Err(ScriptError::CalldataConstruction(format!(
            "{name_or_signature} is overloaded, pass its full signature"
        ))),
        None => Err(ScriptError::CalldataConstruction(format!(
            "no function {name_or_signature}"
        ))),
    }
}

/// Converts a JSON value to a Solidity value of the given type
fn coerce_json(ty: &DynSolType, value: &Value) -> Result<DynSolValue, ScriptError> {
    let coerce_all = |inner: &DynSolType, items: &[Value]| {
        items
            .iter()
            .map(|item| coerce_json(inner, item))
            .collect::<Result<Vec<_>, _>>()
    };

    match (ty, value) {
        (DynSolType::Array(inner), Value::Array(items)) => {
            Ok(DynSolValue::Array(coerce_all(inner, items)?))
        }
        (DynSolType::FixedArray(inner, len), Value::Array(items)) if items.len() == *len => {
            Ok(DynSolValue::FixedArray(coerce_all(inner, items)?))
        }
        (DynSolType::Tuple(types), Value::Array(items)) if items.len() == types.len() => {
            let values = types
                .iter()
                .zip(items)
                .map(|(ty, item)| coerce_json(ty, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Tuple(values))
        }
        (_, Value::String(s)) => ty
            .coerce_str(s)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string())),
        (_, Value::Number(_) | Value::Bool(_)) => ty
            .coerce_str(&value.to_string())
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string())),
        _ => Err(ScriptError::CalldataConstruction(format!(
            "cannot encode {value} as {ty}"
        ))),
    }
}
