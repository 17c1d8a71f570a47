// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! RSASSA-PKCS1-v1_5 and RSA-PSS signatures

use std::str::FromStr;

use crate::algorithm::*;
use crate::completion::Job;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::key::{CryptoKey, CryptoKeyPair};
use crate::rsa::{self, ExportedKey};

fn signature_variant(name: &str) -> Result<RsaVariant> {
    let variant = RsaVariant::from_str(name)?;
    if !variant.is_signature() {
        return Err(Error::not_supported(format!(
            "{} is not a signature algorithm",
            variant
        )));
    }
    Ok(variant)
}

/// Salt length in bytes for PSS, None for PKCS#1 v1.5
fn salt_len(variant: RsaVariant, params: &RsaSignParams) -> Result<Option<usize>> {
    match variant {
        RsaVariant::Pss => Ok(Some(check_rsa_algorithm_params(params)?)),
        _ => Ok(None),
    }
}

pub fn generate_key(
    config: &Config,
    params: &RsaHashedKeyGenParams,
    extractable: bool,
    usages: KeyUsages,
) -> Result<Job<CryptoKeyPair>> {
    signature_variant(&params.name)?;
    rsa::generate_key(config, params, extractable, usages)
}

pub fn export_key(
    format: KeyFormat,
    key: &CryptoKey,
) -> Result<Job<ExportedKey>> {
    signature_variant(key.algorithm().name())?;
    rsa::export_key(format, key)
}

pub fn sign(
    params: &RsaSignParams,
    key: &CryptoKey,
    data: &[u8],
) -> Result<Job<Vec<u8>>> {
    let variant = signature_variant(&params.name)?;
    let salt = salt_len(variant, params)?;
    check_private_key(key)?;
    check_key_algorithm(key, variant, KeyUsages::SIGN)?;
    let hash = resolve_hash(params.hash.as_ref(), key)?;

    let handle = key.rsa_handle()?;
    let data = data.to_vec();
    Ok(Box::new(move || handle.sign(hash, salt, &data)))
}

pub fn verify(
    params: &RsaSignParams,
    key: &CryptoKey,
    signature: &[u8],
    data: &[u8],
) -> Result<Job<bool>> {
    let variant = signature_variant(&params.name)?;
    let salt = salt_len(variant, params)?;
    check_public_key(key)?;
    check_key_algorithm(key, variant, KeyUsages::VERIFY)?;
    let hash = resolve_hash(params.hash.as_ref(), key)?;

    let handle = key.rsa_handle()?;
    let signature = signature.to_vec();
    let data = data.to_vec();
    Ok(Box::new(move || handle.verify(hash, salt, &data, &signature)))
}
