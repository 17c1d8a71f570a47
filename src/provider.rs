// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use std::str::FromStr;

use crate::algorithm::*;
use crate::completion::{Completion, Job};
use crate::config::Config;
use crate::error::Result;
use crate::key::{CryptoKey, CryptoKeyPair};
use crate::rsa::{ExportedKey, KeyData};
use crate::{encryption, rsa, signature};

use log::debug;

/// Entry point of the RSA algorithms.
///
/// Every operation checks its arguments before returning; a bad argument
/// yields a [Completion] that is already resolved with the error, while
/// the actual RSA work is deferred to the completion.
#[derive(Clone, Debug, Default)]
pub struct RsaProvider {
    config: Config,
}

impl RsaProvider {
    pub fn new(config: Config) -> Result<RsaProvider> {
        config.validate()?;
        Ok(RsaProvider { config: config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn dispatch<T: Send + 'static>(
        &self,
        op: &'static str,
        job: Result<Job<T>>,
    ) -> Completion<T> {
        match job {
            Ok(job) => Completion::dispatch(self.config.offload(), op, job),
            Err(e) => {
                debug!("{} rejected: {}", op, e);
                Completion::failed(e)
            }
        }
    }

    pub fn generate_key(
        &self,
        params: &RsaHashedKeyGenParams,
        extractable: bool,
        usages: KeyUsages,
    ) -> Completion<CryptoKeyPair> {
        let job = RsaVariant::from_str(&params.name).and_then(|v| {
            if v.is_signature() {
                signature::generate_key(
                    &self.config,
                    params,
                    extractable,
                    usages,
                )
            } else {
                encryption::generate_key(
                    &self.config,
                    params,
                    extractable,
                    usages,
                )
            }
        });
        self.dispatch("generate_key", job)
    }

    pub fn import_key(
        &self,
        format: KeyFormat,
        key_data: KeyData,
        params: &RsaHashedImportParams,
        extractable: bool,
        usages: KeyUsages,
    ) -> Completion<CryptoKey> {
        self.dispatch(
            "import_key",
            rsa::import_key(format, key_data, params, extractable, usages),
        )
    }

    pub fn export_key(
        &self,
        format: KeyFormat,
        key: &CryptoKey,
    ) -> Completion<ExportedKey> {
        let job = match key.algorithm().as_rsa() {
            Some(a) if a.variant.is_signature() => {
                signature::export_key(format, key)
            }
            _ => encryption::export_key(format, key),
        };
        self.dispatch("export_key", job)
    }

    pub fn sign(
        &self,
        params: &RsaSignParams,
        key: &CryptoKey,
        data: &[u8],
    ) -> Completion<Vec<u8>> {
        self.dispatch("sign", signature::sign(params, key, data))
    }

    /// Resolves to `false` when the signature does not match
    pub fn verify(
        &self,
        params: &RsaSignParams,
        key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> Completion<bool> {
        self.dispatch(
            "verify",
            signature::verify(params, key, signature, data),
        )
    }

    pub fn encrypt(
        &self,
        params: &RsaOaepParams,
        key: &CryptoKey,
        data: &[u8],
    ) -> Completion<Vec<u8>> {
        self.dispatch("encrypt", encryption::encrypt(params, key, data))
    }

    pub fn decrypt(
        &self,
        params: &RsaOaepParams,
        key: &CryptoKey,
        data: &[u8],
    ) -> Completion<Vec<u8>> {
        self.dispatch("decrypt", encryption::decrypt(params, key, data))
    }

    pub fn wrap_key(
        &self,
        key: &CryptoKey,
        wrapping_key: &CryptoKey,
        params: &RsaOaepParams,
    ) -> Completion<Vec<u8>> {
        self.dispatch(
            "wrap_key",
            encryption::wrap_key(key, wrapping_key, params),
        )
    }

    pub fn unwrap_key(
        &self,
        wrapped: &[u8],
        unwrapping_key: &CryptoKey,
        params: &RsaOaepParams,
        unwrapped_algorithm: &str,
        extractable: bool,
        usages: KeyUsages,
    ) -> Completion<CryptoKey> {
        self.dispatch(
            "unwrap_key",
            encryption::unwrap_key(
                wrapped,
                unwrapping_key,
                params,
                unwrapped_algorithm,
                extractable,
                usages,
            ),
        )
    }
}
