// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! Minimal AES key support: the raw import and export needed to carry
//! AES keys through RSA-OAEP key wrapping.

use std::str::FromStr;

use crate::algorithm::KeyUsages;
use crate::error::{Error, Result};
use crate::key::{CryptoKey, KeyAlgorithm};
use crate::{algorithm, param_err, role_err};

use zeroize::Zeroizing;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AesVariant {
    Cbc,
    Gcm,
}

impl AesVariant {
    pub fn name(&self) -> &'static str {
        match self {
            AesVariant::Cbc => "AES-CBC",
            AesVariant::Gcm => "AES-GCM",
        }
    }
}

impl FromStr for AesVariant {
    type Err = Error;

    fn from_str(name: &str) -> Result<AesVariant> {
        match name.to_ascii_uppercase().as_str() {
            "AES-CBC" => Ok(AesVariant::Cbc),
            "AES-GCM" => Ok(AesVariant::Gcm),
            _ => Err(Error::not_supported(format!(
                "unsupported algorithm: {}",
                name
            ))),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AesKeyAlgorithm {
    pub variant: AesVariant,
    /// Key length in bits
    pub length: u32,
}

const AES_USAGES: KeyUsages = KeyUsages::ENCRYPT
    .union(KeyUsages::DECRYPT)
    .union(KeyUsages::WRAP_KEY)
    .union(KeyUsages::UNWRAP_KEY);

pub fn check_usages(variant: AesVariant, usages: KeyUsages) -> Result<()> {
    if usages.is_empty() || !AES_USAGES.contains(usages) {
        return param_err!(
            "invalid key usages {:?} for {}",
            usages.names(),
            variant.name()
        );
    }
    Ok(())
}

pub fn import_raw(
    variant: AesVariant,
    raw: &[u8],
    extractable: bool,
    usages: KeyUsages,
) -> Result<CryptoKey> {
    match raw.len() {
        16 | 24 | 32 => (),
        l => return param_err!("invalid AES key length: {} bytes", l),
    }
    check_usages(variant, usages)?;
    let alg = AesKeyAlgorithm {
        variant: variant,
        length: u32::try_from(raw.len() * 8)?,
    };
    Ok(CryptoKey::new_secret(
        Zeroizing::new(raw.to_vec()),
        alg,
        extractable,
        usages,
    ))
}

pub fn export_raw(key: &CryptoKey) -> Result<Zeroizing<Vec<u8>>> {
    algorithm::check_secret_key(key)?;
    match key.algorithm() {
        KeyAlgorithm::Aes(_) => (),
        _ => return role_err!("not an AES key"),
    }
    key.check_extractable()?;
    Ok(Zeroizing::new(key.secret()?.to_vec()))
}
