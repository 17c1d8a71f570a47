// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! Algorithm descriptors and the stateless parameter checks shared by
//! all the RSA variants.

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::key::{CryptoKey, KeyAlgorithm, KeyType};
use crate::{param_err, role_err};

use bitflags::bitflags;
use serde::Deserialize;

/// Smallest modulus accepted by the provider, in bits
pub const MIN_MODULUS_BITS: u32 = 256;
/// Largest modulus accepted by the provider, in bits
pub const MAX_MODULUS_BITS: u32 = 16384;

pub const RSASSA_PKCS1_V1_5: &str = "RSASSA-PKCS1-v1_5";
pub const RSA_PSS: &str = "RSA-PSS";
pub const RSA_OAEP: &str = "RSA-OAEP";

/// The RSA padding families handled by this provider
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RsaVariant {
    Pkcs1v15,
    Pss,
    Oaep,
}

impl RsaVariant {
    pub fn name(&self) -> &'static str {
        match self {
            RsaVariant::Pkcs1v15 => RSASSA_PKCS1_V1_5,
            RsaVariant::Pss => RSA_PSS,
            RsaVariant::Oaep => RSA_OAEP,
        }
    }

    /// Usages handed to the (public, private) halves of a key pair
    pub fn role_usages(&self) -> (KeyUsages, KeyUsages) {
        match self {
            RsaVariant::Pkcs1v15 | RsaVariant::Pss => {
                (KeyUsages::VERIFY, KeyUsages::SIGN)
            }
            RsaVariant::Oaep => (
                KeyUsages::ENCRYPT | KeyUsages::WRAP_KEY,
                KeyUsages::DECRYPT | KeyUsages::UNWRAP_KEY,
            ),
        }
    }

    pub fn usages_for(&self, key_type: KeyType) -> KeyUsages {
        let (public, private) = self.role_usages();
        match key_type {
            KeyType::Public => public,
            KeyType::Private => private,
            KeyType::Secret => KeyUsages::empty(),
        }
    }

    pub fn is_signature(&self) -> bool {
        *self != RsaVariant::Oaep
    }
}

impl FromStr for RsaVariant {
    type Err = Error;

    fn from_str(name: &str) -> Result<RsaVariant> {
        if name.eq_ignore_ascii_case(RSASSA_PKCS1_V1_5) {
            Ok(RsaVariant::Pkcs1v15)
        } else if name.eq_ignore_ascii_case(RSA_PSS) {
            Ok(RsaVariant::Pss)
        } else if name.eq_ignore_ascii_case(RSA_OAEP) {
            Ok(RsaVariant::Oaep)
        } else {
            Err(Error::not_supported(format!(
                "unsupported algorithm: {}",
                name
            )))
        }
    }
}

impl fmt::Display for RsaVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HashAlg {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlg::Sha1 => "SHA-1",
            HashAlg::Sha224 => "SHA-224",
            HashAlg::Sha256 => "SHA-256",
            HashAlg::Sha384 => "SHA-384",
            HashAlg::Sha512 => "SHA-512",
        }
    }

    /// The numeric designator used to build JWK `alg` tags
    pub fn suffix(&self) -> &'static str {
        match self {
            HashAlg::Sha1 => "1",
            HashAlg::Sha224 => "224",
            HashAlg::Sha256 => "256",
            HashAlg::Sha384 => "384",
            HashAlg::Sha512 => "512",
        }
    }
}

impl FromStr for HashAlg {
    type Err = Error;

    fn from_str(name: &str) -> Result<HashAlg> {
        match name.to_ascii_uppercase().as_str() {
            "SHA-1" => Ok(HashAlg::Sha1),
            "SHA-224" => Ok(HashAlg::Sha224),
            "SHA-256" => Ok(HashAlg::Sha256),
            "SHA-384" => Ok(HashAlg::Sha384),
            "SHA-512" => Ok(HashAlg::Sha512),
            _ => param_err!("unsupported hash algorithm: {}", name),
        }
    }
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The public exponents this provider accepts
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PublicExponent {
    Three,
    F4,
}

impl PublicExponent {
    pub fn value(&self) -> u32 {
        match self {
            PublicExponent::Three => 3,
            PublicExponent::F4 => 65537,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct KeyUsages: u8 {
        const SIGN = 0x01;
        const VERIFY = 0x02;
        const ENCRYPT = 0x04;
        const DECRYPT = 0x08;
        const WRAP_KEY = 0x10;
        const UNWRAP_KEY = 0x20;
    }
}

const USAGE_NAMES: [(&str, KeyUsages); 6] = [
    ("sign", KeyUsages::SIGN),
    ("verify", KeyUsages::VERIFY),
    ("encrypt", KeyUsages::ENCRYPT),
    ("decrypt", KeyUsages::DECRYPT),
    ("wrapKey", KeyUsages::WRAP_KEY),
    ("unwrapKey", KeyUsages::UNWRAP_KEY),
];

impl KeyUsages {
    /// Parses a list of WebCrypto usage names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<KeyUsages> {
        let mut usages = KeyUsages::empty();
        for name in names {
            let name = name.as_ref();
            match USAGE_NAMES.iter().find(|(n, _)| *n == name) {
                Some((_, u)) => usages |= *u,
                None => return param_err!("invalid key usage: {}", name),
            }
        }
        Ok(usages)
    }

    /// Renders the set as WebCrypto usage names, in canonical order
    pub fn names(&self) -> Vec<String> {
        USAGE_NAMES
            .iter()
            .filter(|(_, u)| self.contains(*u))
            .map(|(n, _)| n.to_string())
            .collect()
    }
}

/// Key serialization formats understood by the RSA variants
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyFormat {
    Jwk,
    Pkcs8,
    Spki,
}

impl FromStr for KeyFormat {
    type Err = Error;

    fn from_str(format: &str) -> Result<KeyFormat> {
        match format.to_ascii_lowercase().as_str() {
            "jwk" => Ok(KeyFormat::Jwk),
            "pkcs8" => Ok(KeyFormat::Pkcs8),
            "spki" => Ok(KeyFormat::Spki),
            _ => Err(Error::format(format!(
                "unsupported key format: {}",
                format
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HashParams {
    pub name: String,
}

impl HashParams {
    pub fn new(name: &str) -> HashParams {
        HashParams {
            name: name.to_string(),
        }
    }
}

/// Key generation parameters, `publicExponent` is a big endian byte string
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaHashedKeyGenParams {
    pub name: String,
    pub modulus_length: Option<u32>,
    pub public_exponent: Option<Vec<u8>>,
    pub hash: Option<HashParams>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaHashedImportParams {
    pub name: String,
    pub hash: Option<HashParams>,
}

/// Parameters of sign and verify; `saltLength` (bits) only matters for
/// RSA-PSS
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaSignParams {
    pub name: String,
    pub hash: Option<HashParams>,
    pub salt_length: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaOaepParams {
    pub name: String,
    pub label: Option<Vec<u8>>,
}

/// Normalizes the exponent to hex and maps it to one of the accepted
/// values
pub fn check_exponent(exp: &[u8]) -> Result<PublicExponent> {
    let start = exp.iter().position(|b| *b != 0).unwrap_or(exp.len());
    let hexexp = hex::encode(&exp[start..]);
    match hexexp.as_str() {
        "03" => Ok(PublicExponent::Three),
        "010001" => Ok(PublicExponent::F4),
        _ => param_err!("unsupported public exponent: 0x{}", hexexp),
    }
}

/// Validated key generation request
#[derive(Clone, Debug)]
pub struct RsaGenSpec {
    pub modulus_length: u32,
    pub exponent: PublicExponent,
}

pub fn check_rsa_gen_params(
    params: &RsaHashedKeyGenParams,
    config: &Config,
) -> Result<RsaGenSpec> {
    let bits = match params.modulus_length {
        Some(b) => b,
        None => return param_err!("modulusLength is required"),
    };
    if bits < MIN_MODULUS_BITS || bits > MAX_MODULUS_BITS || bits % 8 != 0 {
        return param_err!(
            "modulusLength must be a multiple of 8 in [{}, {}], got {}",
            MIN_MODULUS_BITS,
            MAX_MODULUS_BITS,
            bits
        );
    }
    let (min, max) = config.modulus_bounds();
    if bits < min || bits > max {
        return param_err!(
            "modulusLength {} outside of the configured range [{}, {}]",
            bits,
            min,
            max
        );
    }
    let exponent = match &params.public_exponent {
        Some(e) => check_exponent(e)?,
        None => return param_err!("publicExponent is required"),
    };
    Ok(RsaGenSpec {
        modulus_length: bits,
        exponent: exponent,
    })
}

pub fn check_algorithm_hashed_params(
    hash: Option<&HashParams>,
) -> Result<HashAlg> {
    match hash {
        Some(h) => HashAlg::from_str(&h.name),
        None => param_err!("a hash algorithm is required"),
    }
}

/// The operation's hash, falling back to the one the key was created with
pub fn resolve_hash(
    hash: Option<&HashParams>,
    key: &CryptoKey,
) -> Result<HashAlg> {
    if hash.is_some() {
        return check_algorithm_hashed_params(hash);
    }
    match key.algorithm().as_rsa().and_then(|a| a.hash) {
        Some(h) => Ok(h),
        None => check_algorithm_hashed_params(None),
    }
}

/// Returns the PSS salt length converted to bytes
pub fn check_rsa_algorithm_params(params: &RsaSignParams) -> Result<usize> {
    match params.salt_length {
        Some(bits) => {
            if bits % 8 != 0 {
                return param_err!(
                    "saltLength must be a multiple of 8, got {}",
                    bits
                );
            }
            Ok(usize::try_from(bits / 8)?)
        }
        None => param_err!("saltLength is required"),
    }
}

/// Requested usages must be a non empty subset of what the variant
/// allows on either half of the key pair
pub fn check_usages(variant: RsaVariant, usages: KeyUsages) -> Result<()> {
    let (public, private) = variant.role_usages();
    if usages.is_empty() {
        return param_err!("key usages must not be empty");
    }
    if !(public | private).contains(usages) {
        return param_err!(
            "invalid key usages {:?} for {}",
            usages.names(),
            variant
        );
    }
    Ok(())
}

fn check_key_type(key: &CryptoKey, key_type: KeyType) -> Result<()> {
    if key.key_type() != key_type {
        return role_err!(
            "a {} key is required, got a {} key",
            key_type,
            key.key_type()
        );
    }
    Ok(())
}

pub fn check_public_key(key: &CryptoKey) -> Result<()> {
    check_key_type(key, KeyType::Public)
}

pub fn check_private_key(key: &CryptoKey) -> Result<()> {
    check_key_type(key, KeyType::Private)
}

pub fn check_secret_key(key: &CryptoKey) -> Result<()> {
    check_key_type(key, KeyType::Secret)
}

/// The key must have been created for `variant` and allow `usage`
pub fn check_key_algorithm(
    key: &CryptoKey,
    variant: RsaVariant,
    usage: KeyUsages,
) -> Result<()> {
    match key.algorithm() {
        KeyAlgorithm::Rsa(alg) if alg.variant == variant => (),
        other => {
            return role_err!(
                "key algorithm {} does not match {}",
                other.name(),
                variant
            )
        }
    }
    if !key.usages().contains(usage) {
        return role_err!("key usages do not permit {:?}", usage.names());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn exponent_normalization() {
        assert_eq!(check_exponent(&[3]).unwrap(), PublicExponent::Three);
        assert_eq!(
            check_exponent(&[0, 0, 1, 0, 1]).unwrap(),
            PublicExponent::F4
        );
        let err = check_exponent(&[1, 0, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
        assert!(check_exponent(&[]).is_err());
    }

    #[test]
    fn modulus_bounds() {
        let config = Config::default();
        let mut params = RsaHashedKeyGenParams {
            name: RSA_PSS.to_string(),
            modulus_length: Some(256),
            public_exponent: Some(vec![1, 0, 1]),
            hash: None,
        };
        assert!(check_rsa_gen_params(&params, &config).is_ok());
        for bad in [255, 16385, 1020, 16392] {
            params.modulus_length = Some(bad);
            let err = check_rsa_gen_params(&params, &config).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parameter);
        }
        params.modulus_length = None;
        assert!(check_rsa_gen_params(&params, &config).is_err());
        params.modulus_length = Some(16384);
        params.public_exponent = None;
        assert!(check_rsa_gen_params(&params, &config).is_err());
    }

    #[test]
    fn hash_names_are_case_insensitive() {
        let h = HashParams::new("sha-384");
        let hash = check_algorithm_hashed_params(Some(&h)).unwrap();
        assert_eq!(hash, HashAlg::Sha384);
        let h = HashParams::new("SHA-3");
        assert!(check_algorithm_hashed_params(Some(&h)).is_err());
        assert!(check_algorithm_hashed_params(None).is_err());
    }

    #[test]
    fn pss_salt_length() {
        let mut params = RsaSignParams {
            name: RSA_PSS.to_string(),
            hash: None,
            salt_length: Some(256),
        };
        assert_eq!(check_rsa_algorithm_params(&params).unwrap(), 32);
        params.salt_length = Some(15);
        let err = check_rsa_algorithm_params(&params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
        params.salt_length = None;
        assert!(check_rsa_algorithm_params(&params).is_err());
    }

    #[test]
    fn usage_names() {
        let u = KeyUsages::from_names(&["wrapKey", "encrypt"]).unwrap();
        assert_eq!(u, KeyUsages::ENCRYPT | KeyUsages::WRAP_KEY);
        assert_eq!(u.names(), vec!["encrypt", "wrapKey"]);
        assert!(KeyUsages::from_names(&["deriveBits"]).is_err());

        assert!(check_usages(RsaVariant::Oaep, u).is_ok());
        assert!(check_usages(RsaVariant::Pss, u).is_err());
        assert!(check_usages(RsaVariant::Pss, KeyUsages::empty()).is_err());
    }

    #[test]
    fn params_from_json() {
        let params: RsaHashedKeyGenParams = serde_json::from_str(
            r#"{
                "name": "RSA-OAEP",
                "modulusLength": 2048,
                "publicExponent": [1, 0, 1],
                "hash": {"name": "SHA-256"}
            }"#,
        )
        .unwrap();
        let spec = check_rsa_gen_params(&params, &Config::default()).unwrap();
        assert_eq!(spec.modulus_length, 2048);
        assert_eq!(spec.exponent, PublicExponent::F4);

        let params: RsaSignParams =
            serde_json::from_str(r#"{"name": "RSA-PSS", "saltLength": 160}"#)
                .unwrap();
        assert_eq!(check_rsa_algorithm_params(&params).unwrap(), 20);
        assert!(params.hash.is_none());
    }

    #[test]
    fn formats_and_names() {
        assert_eq!(KeyFormat::from_str("JWK").unwrap(), KeyFormat::Jwk);
        assert_eq!(KeyFormat::from_str("Pkcs8").unwrap(), KeyFormat::Pkcs8);
        let err = KeyFormat::from_str("raw").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(
            RsaVariant::from_str("rsa-oaep").unwrap(),
            RsaVariant::Oaep
        );
        let err = RsaVariant::from_str("RSA-KEM").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }
}
