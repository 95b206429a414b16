//! Contract call arguments and their coercion to ABI values

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::Param;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

/// A loosely typed argument, resolved against the ABI parameter it is passed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContractArg {
    Uint(u64),
    Text(String),
}

impl From<&str> for ContractArg {
    fn from(value: &str) -> Self {
        ContractArg::Text(value.to_string())
    }
}

impl From<u64> for ContractArg {
    fn from(value: u64) -> Self {
        ContractArg::Uint(value)
    }
}

impl From<Address> for ContractArg {
    fn from(value: Address) -> Self {
        ContractArg::Text(value.to_string())
    }
}

impl ContractArg {
    /// Convert into a value of the given Solidity type
    pub fn coerce(&self, ty: &DynSolType) -> Result<DynSolValue> {
        match (self, ty) {
            (ContractArg::Uint(v), DynSolType::Uint(bits)) => uint_value(U256::from(*v), *bits),
            (ContractArg::Text(s), DynSolType::Uint(bits)) => {
                let v: U256 = s
                    .parse()
                    .map_err(|e| DeployError::Encoding(format!("Invalid uint '{}': {}", s, e)))?;
                uint_value(v, *bits)
            }
            (ContractArg::Text(s), DynSolType::String) => Ok(DynSolValue::String(s.clone())),
            (ContractArg::Text(s), DynSolType::Address) => {
                let addr: Address = s
                    .parse()
                    .map_err(|e| DeployError::Encoding(format!("Invalid address '{}': {}", s, e)))?;
                Ok(DynSolValue::Address(addr))
            }
            (ContractArg::Text(s), DynSolType::Bool) => match s.as_str() {
                "true" => Ok(DynSolValue::Bool(true)),
                "false" => Ok(DynSolValue::Bool(false)),
                _ => Err(DeployError::Encoding(format!("Invalid bool '{}'", s))),
            },
            (arg, ty) => Err(DeployError::Encoding(format!(
                "Cannot pass {:?} as {}",
                arg, ty
            ))),
        }
    }
}

fn uint_value(value: U256, bits: usize) -> Result<DynSolValue> {
    if bits < 256 && value.bit_len() > bits {
        return Err(DeployError::Encoding(format!(
            "Value {} does not fit in uint{}",
            value, bits
        )));
    }
    Ok(DynSolValue::Uint(value, bits))
}

/// Coerce `args` against `params` positionally; counts must match
pub fn coerce_args(params: &[Param], args: &[ContractArg]) -> Result<Vec<DynSolValue>> {
    if params.len() != args.len() {
        return Err(DeployError::Encoding(format!(
            "Expected {} arguments, got {}",
            params.len(),
            args.len()
        )));
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = param.resolve().map_err(|e| {
                DeployError::Encoding(format!("Unsupported parameter type '{}': {}", param.ty, e))
            })?;
            arg.coerce(&ty)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(ty: &str) -> Param {
        serde_json::from_value(serde_json::json!({
            "name": "",
            "type": ty,
            "internalType": ty,
        }))
        .unwrap()
    }

    #[test]
    fn test_coerce_respects_declared_width() {
        let values = coerce_args(
            &[param("string"), param("uint8"), param("uint256")],
            &["QCAT".into(), 18u64.into(), "2000000000".into()],
        )
        .unwrap();

        assert_eq!(
            values,
            vec![
                DynSolValue::String("QCAT".to_string()),
                DynSolValue::Uint(U256::from(18), 8),
                DynSolValue::Uint(U256::from(2_000_000_000u64), 256),
            ]
        );
    }

    #[test]
    fn test_coerce_rejects_overflow() {
        let err = ContractArg::Uint(256).coerce(&DynSolType::Uint(8)).unwrap_err();
        assert!(matches!(err, DeployError::Encoding(_)));
    }

    #[test]
    fn test_coerce_address() {
        let addr = Address::repeat_byte(0x11);
        let value = ContractArg::from(addr).coerce(&DynSolType::Address).unwrap();
        assert_eq!(value, DynSolValue::Address(addr));
    }

    #[test]
    fn test_coerce_type_mismatch() {
        assert!(ContractArg::Uint(1).coerce(&DynSolType::String).is_err());
        assert!(ContractArg::Text("abc".into()).coerce(&DynSolType::Uint(256)).is_err());
    }

    #[test]
    fn test_argument_count_mismatch() {
        let err = coerce_args(&[param("string")], &[]).unwrap_err();
        assert!(err.to_string().contains("Expected 1 arguments, got 0"));
    }

    #[test]
    fn test_deserialize_mixed_args() {
        let args: Vec<ContractArg> =
            serde_json::from_str(r#"["The Quantum Cat", "QCAT", 18, 2000000000]"#).unwrap();
        assert_eq!(args[0], ContractArg::Text("The Quantum Cat".to_string()));
        assert_eq!(args[2], ContractArg::Uint(18));
        assert_eq!(args[3], ContractArg::Uint(2_000_000_000));
    }
}
