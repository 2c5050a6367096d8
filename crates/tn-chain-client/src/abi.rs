use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{U256, hex};
use tn_api_types::{MintRequest, TokenIdMode, TreeRecord};

use crate::error::{ChainError, Result};
use crate::units::parse_address;

const MINT: &str = "mint";
const TOTAL_MINTED_TREES: &str = "getTotalMintedTrees";
const TREE_INFO: &str = "getTreeInfo";

/// `mint` arguments after the owner and the optional token id:
/// species, age, location, proofOfPlant, proofOfLife, tokenURI.
const MINT_TREE_ARGS: usize = 6;

const TREE_FIELDS: usize = 5;

/// The tree contract's ABI, checked once against the configured
/// [`TokenIdMode`] and then used to encode calls and decode results.
#[derive(Debug, Clone)]
pub struct TreeAbi {
    mint: Function,
    total_minted_trees: Function,
    tree_info: Function,
    token_id_mode: TokenIdMode,
}

impl TreeAbi {
    pub fn from_json(json: &str, token_id_mode: TokenIdMode) -> Result<Self> {
        let abi: JsonAbi = serde_json::from_str(json)
            .map_err(|err| ChainError::Abi(format!("invalid abi json: {err}")))?;

        let mint = abi
            .function(MINT)
            .and_then(|overloads| {
                overloads
                    .iter()
                    .find(|function| mint_matches(function, token_id_mode))
            })
            .cloned()
            .ok_or_else(|| {
                ChainError::AbiMismatch(format!(
                    "no `mint` overload takes {} arguments as required by token id mode {token_id_mode}",
                    mint_arity(token_id_mode)
                ))
            })?;

        let total_minted_trees = first_function(&abi, TOTAL_MINTED_TREES)?;
        let tree_info = first_function(&abi, TREE_INFO)?;
        if tree_info.inputs.len() != 1 {
            return Err(ChainError::AbiMismatch(format!(
                "`{TREE_INFO}` takes {} arguments, expected a single index",
                tree_info.inputs.len()
            )));
        }

        Ok(Self {
            mint,
            total_minted_trees,
            tree_info,
            token_id_mode,
        })
    }

    pub fn token_id_mode(&self) -> TokenIdMode {
        self.token_id_mode
    }

    pub fn encode_mint(&self, request: &MintRequest) -> Result<Vec<u8>> {
        let mut args = Vec::with_capacity(mint_arity(self.token_id_mode));
        args.push(request.owner.0.clone());

        if self.token_id_mode == TokenIdMode::Explicit {
            let token_id = request.token_id.ok_or_else(|| {
                ChainError::Abi("explicit token id mode requires a token id".to_owned())
            })?;
            args.push(token_id.to_string());
        }

        args.extend(request.tree.columns().iter().map(|column| column.to_string()));
        args.push(request.token_uri.clone());

        encode_call(&self.mint, &args)
    }

    pub fn encode_total_minted_trees(&self) -> Result<Vec<u8>> {
        encode_call(&self.total_minted_trees, &[])
    }

    pub fn decode_total_minted_trees(&self, data: &[u8]) -> Result<u64> {
        let values = self.total_minted_trees.abi_decode_output(data, true)?;
        match values.first() {
            Some(DynSolValue::Uint(total, _)) => u64::try_from(*total).map_err(|_| {
                ChainError::InvalidResponse(format!("total minted trees {total} does not fit in u64"))
            }),
            other => Err(ChainError::InvalidResponse(format!(
                "unexpected `{TOTAL_MINTED_TREES}` output: {other:?}"
            ))),
        }
    }

    pub fn encode_tree_info(&self, index: u64) -> Result<Vec<u8>> {
        encode_call(&self.tree_info, &[index.to_string()])
    }

    pub fn decode_tree_info(&self, data: &[u8]) -> Result<TreeRecord> {
        let mut values = self.tree_info.abi_decode_output(data, true)?;

        // Contracts returning a struct yield one tuple instead of positional fields.
        if let [DynSolValue::Tuple(fields)] = values.as_slice() {
            values = fields.clone();
        }

        if values.len() < TREE_FIELDS {
            return Err(ChainError::InvalidResponse(format!(
                "`{TREE_INFO}` returned {} fields, expected {TREE_FIELDS}",
                values.len()
            )));
        }

        let mut fields = values.iter().map(display_value);
        let mut next = || fields.next().unwrap_or_default();
        Ok(TreeRecord {
            species: next(),
            age: next(),
            location: next(),
            proof_of_plant: next(),
            proof_of_life: next(),
        })
    }
}

fn mint_arity(mode: TokenIdMode) -> usize {
    match mode {
        TokenIdMode::Implicit => 1 + MINT_TREE_ARGS,
        TokenIdMode::Explicit => 2 + MINT_TREE_ARGS,
    }
}

fn mint_matches(function: &Function, mode: TokenIdMode) -> bool {
    let inputs = &function.inputs;
    if inputs.len() != mint_arity(mode) || inputs[0].ty != "address" {
        return false;
    }

    match mode {
        TokenIdMode::Implicit => true,
        TokenIdMode::Explicit => inputs[1].ty.starts_with("uint"),
    }
}

fn first_function(abi: &JsonAbi, name: &str) -> Result<Function> {
    abi.function(name)
        .and_then(|overloads| overloads.first())
        .cloned()
        .ok_or_else(|| ChainError::AbiMismatch(format!("abi has no `{name}` function")))
}

fn encode_call(function: &Function, args: &[String]) -> Result<Vec<u8>> {
    if function.inputs.len() != args.len() {
        return Err(ChainError::AbiMismatch(format!(
            "`{}` takes {} arguments, got {}",
            function.name,
            function.inputs.len(),
            args.len()
        )));
    }

    let values = function
        .inputs
        .iter()
        .zip(args)
        .map(|(param, raw)| coerce_arg(&param.resolve()?, raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(function.abi_encode_input(&values)?)
}

/// Form values arrive as text; turn them into whatever the ABI declares.
fn coerce_arg(ty: &DynSolType, raw: &str) -> Result<DynSolValue> {
    match ty {
        DynSolType::String => Ok(DynSolValue::String(raw.to_owned())),
        DynSolType::Address => parse_address(raw).map(DynSolValue::Address),
        DynSolType::Uint(bits) => raw
            .trim()
            .parse::<U256>()
            .map(|value| DynSolValue::Uint(value, *bits))
            .map_err(|err| ChainError::Abi(format!("invalid unsigned integer '{raw}': {err}"))),
        other => Ok(other.coerce_str(raw)?),
    }
}

fn display_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::String(text) => text.clone(),
        DynSolValue::Uint(number, _) => number.to_string(),
        DynSolValue::Int(number, _) => number.to_string(),
        DynSolValue::Bool(flag) => flag.to_string(),
        DynSolValue::Address(address) => address.to_checksum(None),
        DynSolValue::Bytes(bytes) => hex::encode_prefixed(bytes),
        DynSolValue::FixedBytes(word, size) => hex::encode_prefixed(&word.as_slice()[..*size]),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_api_types::WalletAddress;

    const TREE_ABI: &str = include_str!("../../../contract/Tree.abi.json");

    const EXPLICIT_ABI: &str = r#"[
      {"type":"function","name":"mint","stateMutability":"nonpayable","outputs":[],"inputs":[
        {"name":"to","type":"address"},{"name":"tokenId","type":"uint256"},
        {"name":"species","type":"string"},{"name":"age","type":"uint256"},
        {"name":"location","type":"string"},{"name":"proofOfPlant","type":"string"},
        {"name":"proofOfLife","type":"string"},{"name":"tokenURI","type":"string"}]},
      {"type":"function","name":"getTotalMintedTrees","stateMutability":"view","inputs":[],
        "outputs":[{"name":"","type":"uint256"}]},
      {"type":"function","name":"getTreeInfo","stateMutability":"view",
        "inputs":[{"name":"index","type":"uint256"}],
        "outputs":[{"name":"","type":"tuple","components":[
          {"name":"species","type":"string"},{"name":"age","type":"uint256"},
          {"name":"location","type":"string"},{"name":"proofOfPlant","type":"string"},
          {"name":"proofOfLife","type":"string"}]}]}
    ]"#;

    fn request(age: &str, token_id: Option<u64>) -> MintRequest {
        MintRequest {
            owner: WalletAddress("0x1111111111111111111111111111111111111111".to_owned()),
            token_id,
            tree: TreeRecord {
                species: "Acacia".to_owned(),
                age: age.to_owned(),
                location: "Kisumu".to_owned(),
                proof_of_plant: "ipfs://plant".to_owned(),
                proof_of_life: "ipfs://life".to_owned(),
            },
            token_uri: "https://ipfs".to_owned(),
        }
    }

    #[test]
    fn shipped_abi_only_supports_implicit_token_ids() {
        let abi = TreeAbi::from_json(TREE_ABI, TokenIdMode::Implicit).unwrap();
        assert_eq!(abi.token_id_mode(), TokenIdMode::Implicit);

        let err = TreeAbi::from_json(TREE_ABI, TokenIdMode::Explicit).unwrap_err();
        assert!(matches!(err, ChainError::AbiMismatch(_)), "got {err}");
    }

    #[test]
    fn missing_read_methods_are_rejected() {
        let abi = r#"[{"type":"function","name":"mint","stateMutability":"nonpayable","outputs":[],
          "inputs":[{"name":"to","type":"address"},{"name":"a","type":"string"},
          {"name":"b","type":"string"},{"name":"c","type":"string"},{"name":"d","type":"string"},
          {"name":"e","type":"string"},{"name":"f","type":"string"}]}]"#;

        let err = TreeAbi::from_json(abi, TokenIdMode::Implicit).unwrap_err();
        assert!(err.to_string().contains("getTotalMintedTrees"), "got {err}");
    }

    #[test]
    fn implicit_mint_encodes_owner_tree_fields_and_uri() {
        let abi = TreeAbi::from_json(TREE_ABI, TokenIdMode::Implicit).unwrap();
        let data = abi.encode_mint(&request("4", None)).unwrap();

        assert_eq!(&data[..4], abi.mint.selector().as_slice());
        let values = abi.mint.abi_decode_input(&data[4..], true).unwrap();
        assert_eq!(values.len(), 7);
        assert_eq!(values[1], DynSolValue::String("Acacia".to_owned()));
        assert_eq!(values[2], DynSolValue::String("4".to_owned()));
        assert_eq!(values[6], DynSolValue::String("https://ipfs".to_owned()));
    }

    #[test]
    fn explicit_mint_requires_and_passes_token_id() {
        let abi = TreeAbi::from_json(EXPLICIT_ABI, TokenIdMode::Explicit).unwrap();

        let err = abi.encode_mint(&request("4", None)).unwrap_err();
        assert!(matches!(err, ChainError::Abi(_)));

        let data = abi.encode_mint(&request("4", Some(7))).unwrap();
        let values = abi.mint.abi_decode_input(&data[4..], true).unwrap();
        assert_eq!(values[1], DynSolValue::Uint(U256::from(7u64), 256));
        assert_eq!(values[3], DynSolValue::Uint(U256::from(4u64), 256));
    }

    #[test]
    fn numeric_age_must_parse() {
        let abi = TreeAbi::from_json(EXPLICIT_ABI, TokenIdMode::Explicit).unwrap();
        let err = abi.encode_mint(&request("four", Some(1))).unwrap_err();
        assert!(err.to_string().contains("four"), "got {err}");
    }

    #[test]
    fn decodes_total_minted_trees() {
        let abi = TreeAbi::from_json(TREE_ABI, TokenIdMode::Implicit).unwrap();
        let data = DynSolValue::Uint(U256::from(3u64), 256).abi_encode();
        assert_eq!(abi.decode_total_minted_trees(&data).unwrap(), 3);
    }

    #[test]
    fn decodes_positional_tree_info() {
        let abi = TreeAbi::from_json(TREE_ABI, TokenIdMode::Implicit).unwrap();
        let data = DynSolValue::Tuple(
            ["Oak", "12", "Eldoret", "ipfs://p", "ipfs://l"]
                .into_iter()
                .map(|field| DynSolValue::String(field.to_owned()))
                .collect(),
        )
        .abi_encode_params();

        let tree = abi.decode_tree_info(&data).unwrap();
        assert_eq!(tree.columns(), ["Oak", "12", "Eldoret", "ipfs://p", "ipfs://l"]);
    }

    #[test]
    fn decodes_struct_tree_info_with_numeric_age() {
        let abi = TreeAbi::from_json(EXPLICIT_ABI, TokenIdMode::Explicit).unwrap();
        let record = DynSolValue::Tuple(vec![
            DynSolValue::String("Baobab".to_owned()),
            DynSolValue::Uint(U256::from(250u64), 256),
            DynSolValue::String("Kilifi".to_owned()),
            DynSolValue::String("ipfs://p".to_owned()),
            DynSolValue::String("ipfs://l".to_owned()),
        ]);
        let data = DynSolValue::Tuple(vec![record]).abi_encode_params();

        let tree = abi.decode_tree_info(&data).unwrap();
        assert_eq!(tree.species, "Baobab");
        assert_eq!(tree.age, "250");
        assert_eq!(tree.proof_of_life, "ipfs://l");
    }
}
