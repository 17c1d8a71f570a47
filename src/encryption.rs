// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! RSA-OAEP encryption and AES key wrapping

use std::str::FromStr;

use crate::aes::{self, AesVariant};
use crate::algorithm::*;
use crate::completion::Job;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::key::{CryptoKey, CryptoKeyPair};
use crate::rsa::{self, ExportedKey};

use zeroize::Zeroizing;

fn check_oaep_name(name: &str) -> Result<()> {
    match RsaVariant::from_str(name)? {
        RsaVariant::Oaep => Ok(()),
        v => Err(Error::not_supported(format!(
            "{} is not an encryption algorithm",
            v
        ))),
    }
}

pub fn generate_key(
    config: &Config,
    params: &RsaHashedKeyGenParams,
    extractable: bool,
    usages: KeyUsages,
) -> Result<Job<CryptoKeyPair>> {
    check_oaep_name(&params.name)?;
    rsa::generate_key(config, params, extractable, usages)
}

pub fn export_key(
    format: KeyFormat,
    key: &CryptoKey,
) -> Result<Job<ExportedKey>> {
    check_oaep_name(key.algorithm().name())?;
    rsa::export_key(format, key)
}

pub fn encrypt(
    params: &RsaOaepParams,
    key: &CryptoKey,
    data: &[u8],
) -> Result<Job<Vec<u8>>> {
    check_oaep_name(&params.name)?;
    check_public_key(key)?;
    check_key_algorithm(key, RsaVariant::Oaep, KeyUsages::ENCRYPT)?;
    let hash = resolve_hash(None, key)?;

    let handle = key.rsa_handle()?;
    let label = params.label.clone();
    let data = data.to_vec();
    Ok(Box::new(move || {
        handle.encrypt_oaep(hash, label.as_deref(), &data)
    }))
}

pub fn decrypt(
    params: &RsaOaepParams,
    key: &CryptoKey,
    data: &[u8],
) -> Result<Job<Vec<u8>>> {
    check_oaep_name(&params.name)?;
    check_private_key(key)?;
    check_key_algorithm(key, RsaVariant::Oaep, KeyUsages::DECRYPT)?;
    let hash = resolve_hash(None, key)?;

    let handle = key.rsa_handle()?;
    let label = params.label.clone();
    let data = data.to_vec();
    Ok(Box::new(move || {
        handle.decrypt_oaep(hash, label.as_deref(), &data)
    }))
}

/// Encrypts the raw bytes of the secret `key` under `wrapping_key`
pub fn wrap_key(
    key: &CryptoKey,
    wrapping_key: &CryptoKey,
    params: &RsaOaepParams,
) -> Result<Job<Vec<u8>>> {
    check_oaep_name(&params.name)?;
    check_secret_key(key)?;
    check_public_key(wrapping_key)?;
    check_key_algorithm(wrapping_key, RsaVariant::Oaep, KeyUsages::WRAP_KEY)?;
    let hash = resolve_hash(None, wrapping_key)?;
    let raw = aes::export_raw(key)?;

    let handle = wrapping_key.rsa_handle()?;
    let label = params.label.clone();
    Ok(Box::new(move || {
        handle.encrypt_oaep(hash, label.as_deref(), &raw)
    }))
}

/// Recovers a secret key wrapped with `wrap_key` and imports it as
/// `unwrapped_algorithm` (AES-CBC or AES-GCM)
pub fn unwrap_key(
    wrapped: &[u8],
    unwrapping_key: &CryptoKey,
    params: &RsaOaepParams,
    unwrapped_algorithm: &str,
    extractable: bool,
    usages: KeyUsages,
) -> Result<Job<CryptoKey>> {
    check_oaep_name(&params.name)?;
    check_private_key(unwrapping_key)?;
    check_key_algorithm(
        unwrapping_key,
        RsaVariant::Oaep,
        KeyUsages::UNWRAP_KEY,
    )?;
    let hash = resolve_hash(None, unwrapping_key)?;
    let target = AesVariant::from_str(unwrapped_algorithm)?;
    aes::check_usages(target, usages)?;

    let handle = unwrapping_key.rsa_handle()?;
    let label = params.label.clone().unwrap_or_default();
    let wrapped = wrapped.to_vec();
    Ok(Box::new(move || {
        let raw =
            Zeroizing::new(handle.decrypt_oaep(hash, Some(&label), &wrapped)?);
        aes::import_raw(target, &raw, extractable, usages)
    }))
}
