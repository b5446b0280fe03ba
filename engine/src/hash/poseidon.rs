use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonHasher};
use num_bigint::BigUint;

use crate::{Error, Result};

pub const HASH_LEN: usize = 32;

/// A big-endian encoded scalar field element.
pub type HashBytes = [u8; HASH_LEN];

/// Poseidon hash with the circom parameters for `inputs.len()` inputs.
pub fn hash(inputs: &[Fr]) -> Result<Fr>
{
    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
        .map_err(|e| Error::Hash(format!("{:?}", e)))?;

    hasher
        .hash(inputs)
        .map_err(|e| Error::Hash(format!("{:?}", e)))
}

/// Hash of a (left, right) pair, used to fold salts into roots.
pub fn hash_left_right(left: Fr, right: Fr) -> Result<Fr>
{
    hash(&[left, right])
}

pub fn hash3(inputs: [Fr; 3]) -> Result<Fr>
{
    hash(&inputs)
}

/// Hash of the children of a single quinary tree node.
pub fn hash5(inputs: &[Fr; 5]) -> Result<Fr>
{
    hash(inputs)
}

/// The field modulus as an arbitrary precision integer.
pub fn modulus() -> BigUint
{
    BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le())
}

/// Converts an integer into a field element, rejecting values that would be reduced.
pub fn fr_from_biguint(value: &BigUint) -> Result<Fr>
{
    if *value >= modulus()
    {
        return Err(Error::InvalidFieldElement(value.to_string()));
    }

    Ok(Fr::from_be_bytes_mod_order(&value.to_bytes_be()))
}

pub fn fr_to_biguint(value: &Fr) -> BigUint
{
    BigUint::from_bytes_be(&value.into_bigint().to_bytes_be())
}

/// Big-endian 32 byte encoding, matching a solidity `uint256`.
pub fn fr_to_bytes(value: &Fr) -> HashBytes
{
    let encoded = value.into_bigint().to_bytes_be();

    let mut bytes = [0u8; HASH_LEN];
    bytes[HASH_LEN - encoded.len()..].copy_from_slice(&encoded);
    bytes
}

pub fn fr_from_bytes(bytes: &HashBytes) -> Result<Fr>
{
    fr_from_biguint(&BigUint::from_bytes_be(bytes))
}

pub fn biguint_to_bytes(value: &BigUint) -> Result<HashBytes>
{
    let encoded = value.to_bytes_be();
    if encoded.len() > HASH_LEN
    {
        return Err(Error::InvalidFieldElement(value.to_string()));
    }

    let mut bytes = [0u8; HASH_LEN];
    bytes[HASH_LEN - encoded.len()..].copy_from_slice(&encoded);
    Ok(bytes)
}

/// Fixed width `0x` prefixed hex rendering of a field element.
pub fn fr_to_hex(value: &Fr) -> String
{
    format!("0x{}", hex::encode(fr_to_bytes(value)))
}
