// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

pub use crate::algorithm::*;
pub use crate::config::Config;
pub use crate::error::ErrorKind;
pub use crate::key::{CryptoKey, CryptoKeyPair, KeyAlgorithm, KeyType};
pub use crate::provider::RsaProvider;
pub use crate::rsa::{ExportedKey, KeyData};
pub use crate::JsonWebKey;

use once_cell::sync::Lazy;

macro_rules! ret_or_panic {
    ($ret:expr) => {
        match $ret {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        }
    };
}
pub(crate) use ret_or_panic;

/// Asserts that `$completion` already failed with `$kind`, without waiting
/// on any engine work
macro_rules! assert_rejected {
    ($completion:expr, $kind:expr) => {{
        let completion = $completion;
        assert!(completion.is_resolved());
        match completion.await {
            Ok(_) => panic!("operation unexpectedly succeeded"),
            Err(e) => assert_eq!(e.kind(), $kind, "{}", e),
        }
    }};
}
pub(crate) use assert_rejected;

pub const SIGN_USAGES: KeyUsages = KeyUsages::SIGN.union(KeyUsages::VERIFY);
pub const OAEP_USAGES: KeyUsages = KeyUsages::ENCRYPT
    .union(KeyUsages::DECRYPT)
    .union(KeyUsages::WRAP_KEY)
    .union(KeyUsages::UNWRAP_KEY);

pub fn gen_params(
    name: &str,
    bits: u32,
    exponent: &[u8],
    hash: Option<&str>,
) -> RsaHashedKeyGenParams {
    RsaHashedKeyGenParams {
        name: name.to_string(),
        modulus_length: Some(bits),
        public_exponent: Some(exponent.to_vec()),
        hash: hash.map(HashParams::new),
    }
}

pub fn import_params(name: &str, hash: &str) -> RsaHashedImportParams {
    RsaHashedImportParams {
        name: name.to_string(),
        hash: Some(HashParams::new(hash)),
    }
}

pub fn sign_params(name: &str, salt_length: Option<u32>) -> RsaSignParams {
    RsaSignParams {
        name: name.to_string(),
        hash: None,
        salt_length: salt_length,
    }
}

pub fn oaep_params(label: Option<&[u8]>) -> RsaOaepParams {
    RsaOaepParams {
        name: RSA_OAEP.to_string(),
        label: label.map(|l| l.to_vec()),
    }
}

/// Generates a key pair synchronously, bypassing the completion machinery
pub fn generate_now(name: &str, bits: u32, hash: &str) -> CryptoKeyPair {
    let usages = if name == RSA_OAEP {
        OAEP_USAGES
    } else {
        SIGN_USAGES
    };
    let job = ret_or_panic!(crate::rsa::generate_key(
        &Config::default(),
        &gen_params(name, bits, &[1, 0, 1], Some(hash)),
        true,
        usages,
    ));
    ret_or_panic!(job())
}

pub static PKCS1_KEYS: Lazy<CryptoKeyPair> =
    Lazy::new(|| generate_now(RSASSA_PKCS1_V1_5, 1024, "SHA-256"));
pub static PSS_KEYS: Lazy<CryptoKeyPair> =
    Lazy::new(|| generate_now(RSA_PSS, 1024, "SHA-256"));
pub static OAEP_KEYS: Lazy<CryptoKeyPair> =
    Lazy::new(|| generate_now(RSA_OAEP, 1024, "SHA-256"));

mod generate;
