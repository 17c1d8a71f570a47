// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

//! This is subtle-rsa
//!
//! The RSA algorithm family of a WebCrypto compatible provider:
//! RSASSA-PKCS1-v1_5 and RSA-PSS signatures, RSA-OAEP encryption and key
//! wrapping, key generation and import/export as JWK, PKCS#8 and SPKI.
//!
//! All operations go through [RsaProvider], which validates arguments
//! synchronously and returns a [Completion] future delivering the result.

pub mod error;

mod completion;
mod native;

pub mod aes;
pub mod algorithm;
pub mod config;
pub mod encryption;
pub mod jwk;
pub mod key;
pub mod provider;
pub mod rsa;
pub mod signature;

#[cfg(feature = "logger")]
pub mod logger;

pub use algorithm::{
    HashAlg, HashParams, KeyFormat, KeyUsages, RsaHashedImportParams,
    RsaHashedKeyGenParams, RsaOaepParams, RsaSignParams, RsaVariant,
};
pub use completion::Completion;
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use jwk::JsonWebKey;
pub use key::{CryptoKey, CryptoKeyPair, KeyAlgorithm, KeyType};
pub use provider::RsaProvider;
pub use self::rsa::{ExportedKey, KeyData};

#[cfg(test)]
mod tests;
