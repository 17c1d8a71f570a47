// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

//! Key generation, import and export shared by all the RSA variants

use std::str::FromStr;
use std::sync::Arc;

use crate::algorithm::*;
use crate::completion::Job;
use crate::config::Config;
use crate::error::Result;
use crate::jwk::{self, JsonWebKey};
use crate::key::{CryptoKey, CryptoKeyPair, KeyType, RsaKeyAlgorithm};
use crate::native::rsa::KeyHandle;
use crate::{format_err, role_err};

use log::trace;

/// Key material handed to `import_key`
#[derive(Clone, Debug)]
pub enum KeyData {
    Jwk(JsonWebKey),
    Der(Vec<u8>),
}

/// Result of `export_key`
#[derive(Clone, Debug, PartialEq)]
pub enum ExportedKey {
    Jwk(JsonWebKey),
    Der(Vec<u8>),
}

impl ExportedKey {
    pub fn as_jwk(&self) -> Option<&JsonWebKey> {
        match self {
            ExportedKey::Jwk(j) => Some(j),
            ExportedKey::Der(_) => None,
        }
    }

    pub fn as_der(&self) -> Option<&[u8]> {
        match self {
            ExportedKey::Der(d) => Some(d),
            ExportedKey::Jwk(_) => None,
        }
    }
}

fn optional_hash(hash: Option<&HashParams>) -> Result<Option<HashAlg>> {
    match hash {
        Some(_) => Ok(Some(check_algorithm_hashed_params(hash)?)),
        None => Ok(None),
    }
}

fn wrap_key(
    handle: &Arc<KeyHandle>,
    algorithm: RsaKeyAlgorithm,
    key_type: KeyType,
    extractable: bool,
) -> CryptoKey {
    let usages = algorithm.variant.usages_for(key_type);
    CryptoKey::new_rsa(
        handle.clone(),
        algorithm,
        key_type,
        extractable,
        usages,
    )
}

pub fn generate_key(
    config: &Config,
    params: &RsaHashedKeyGenParams,
    extractable: bool,
    usages: KeyUsages,
) -> Result<Job<CryptoKeyPair>> {
    let variant = RsaVariant::from_str(&params.name)?;
    let spec = check_rsa_gen_params(params, config)?;
    let hash = optional_hash(params.hash.as_ref())?;
    check_usages(variant, usages)?;
    trace!(
        "generate {} {} bits, e={}",
        variant,
        spec.modulus_length,
        spec.exponent.value()
    );

    Ok(Box::new(move || {
        let handle =
            Arc::new(KeyHandle::generate(spec.modulus_length, spec.exponent)?);
        let algorithm = RsaKeyAlgorithm {
            variant: variant,
            modulus_length: handle.modulus_bits(),
            public_exponent: handle.public_exponent(),
            hash: hash,
        };
        let public = Arc::new(handle.to_public());
        /* public keys are always extractable */
        Ok(CryptoKeyPair {
            public_key: wrap_key(
                &public,
                algorithm.clone(),
                KeyType::Public,
                true,
            ),
            private_key: wrap_key(
                &handle,
                algorithm,
                KeyType::Private,
                extractable,
            ),
        })
    }))
}

fn check_jwk_metadata(
    jwk: &JsonWebKey,
    variant: RsaVariant,
    hash: Option<HashAlg>,
    extractable: bool,
) -> Result<()> {
    if let (Some(alg), Some(hash)) = (&jwk.alg, hash) {
        let expected = jwk::jwk_alg(variant, hash);
        if *alg != expected {
            return format_err!(
                "JWK alg {} does not match the expected {}",
                alg,
                expected
            );
        }
    }
    if jwk.ext == Some(false) && extractable {
        return format_err!("JWK is not extractable");
    }
    Ok(())
}

pub fn import_key(
    format: KeyFormat,
    key_data: KeyData,
    params: &RsaHashedImportParams,
    extractable: bool,
    usages: KeyUsages,
) -> Result<Job<CryptoKey>> {
    let variant = RsaVariant::from_str(&params.name)?;
    let hash = optional_hash(params.hash.as_ref())?;
    check_usages(variant, usages)?;

    let job: Box<dyn FnOnce() -> Result<KeyHandle> + Send> =
        match (format, key_data) {
            (KeyFormat::Jwk, KeyData::Jwk(jwk)) => {
                check_jwk_metadata(&jwk, variant, hash, extractable)?;
                let components = jwk::import_jwk(&jwk)?;
                Box::new(move || KeyHandle::from_components(&components))
            }
            (KeyFormat::Pkcs8, KeyData::Der(der)) => {
                Box::new(move || KeyHandle::from_pkcs8_der(&der))
            }
            (KeyFormat::Spki, KeyData::Der(der)) => {
                Box::new(move || KeyHandle::from_spki_der(&der))
            }
            (KeyFormat::Jwk, KeyData::Der(_)) => {
                return format_err!("jwk import requires a JSON Web Key")
            }
            (f, KeyData::Jwk(_)) => {
                return format_err!("{:?} import requires binary data", f)
            }
        };

    Ok(Box::new(move || {
        let handle = Arc::new(job()?);
        let key_type = if handle.is_private() {
            KeyType::Private
        } else {
            KeyType::Public
        };
        /* the key describes itself, size and exponent come from the
         * imported material */
        let algorithm = RsaKeyAlgorithm {
            variant: variant,
            modulus_length: handle.modulus_bits(),
            public_exponent: handle.public_exponent(),
            hash: hash,
        };
        Ok(wrap_key(&handle, algorithm, key_type, extractable))
    }))
}

pub fn export_key(
    format: KeyFormat,
    key: &CryptoKey,
) -> Result<Job<ExportedKey>> {
    if key.algorithm().as_rsa().is_none() {
        return role_err!("not an RSA key");
    }
    key.check_extractable()?;
    match format {
        KeyFormat::Spki => check_public_key(key)?,
        KeyFormat::Pkcs8 => check_private_key(key)?,
        KeyFormat::Jwk => {
            let key = key.clone();
            return Ok(Box::new(move || {
                Ok(ExportedKey::Jwk(jwk::export_jwk(&key)?))
            }));
        }
    }
    let handle = key.rsa_handle()?;
    Ok(Box::new(move || {
        let der = match format {
            KeyFormat::Pkcs8 => handle.to_pkcs8_der()?,
            _ => handle.to_spki_der()?,
        };
        Ok(ExportedKey::Der(der))
    }))
}
