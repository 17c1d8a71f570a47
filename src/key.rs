// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use std::fmt;
use std::sync::Arc;

use crate::aes::AesKeyAlgorithm;
use crate::algorithm::{HashAlg, KeyUsages, RsaVariant};
use crate::error::Result;
use crate::native::rsa::KeyHandle;
use crate::role_err;

use zeroize::Zeroizing;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyType {
    Public,
    Private,
    Secret,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            KeyType::Public => "public",
            KeyType::Private => "private",
            KeyType::Secret => "secret",
        })
    }
}

/// Descriptor of an RSA key
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RsaKeyAlgorithm {
    pub variant: RsaVariant,
    pub modulus_length: u32,
    /// Big endian, no leading zeros
    pub public_exponent: Vec<u8>,
    pub hash: Option<HashAlg>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyAlgorithm {
    Rsa(RsaKeyAlgorithm),
    Aes(AesKeyAlgorithm),
}

impl KeyAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa(a) => a.variant.name(),
            KeyAlgorithm::Aes(a) => a.variant.name(),
        }
    }

    pub fn as_rsa(&self) -> Option<&RsaKeyAlgorithm> {
        match self {
            KeyAlgorithm::Rsa(a) => Some(a),
            KeyAlgorithm::Aes(_) => None,
        }
    }
}

#[derive(Clone)]
pub(crate) enum Handle {
    Rsa(Arc<KeyHandle>),
    Secret(Arc<Zeroizing<Vec<u8>>>),
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Handle::Rsa(h) => h.fmt(f),
            Handle::Secret(s) => write!(f, "Secret({} bytes)", s.len()),
        }
    }
}

/// A key as seen by provider users.
///
/// Keys are immutable; clones share the same native handle so they can be
/// moved into concurrent operations freely.
#[derive(Clone, Debug)]
pub struct CryptoKey {
    handle: Handle,
    algorithm: KeyAlgorithm,
    key_type: KeyType,
    extractable: bool,
    usages: KeyUsages,
}

impl CryptoKey {
    pub(crate) fn new_rsa(
        handle: Arc<KeyHandle>,
        algorithm: RsaKeyAlgorithm,
        key_type: KeyType,
        extractable: bool,
        usages: KeyUsages,
    ) -> CryptoKey {
        CryptoKey {
            handle: Handle::Rsa(handle),
            algorithm: KeyAlgorithm::Rsa(algorithm),
            key_type: key_type,
            extractable: extractable,
            usages: usages,
        }
    }

    pub(crate) fn new_secret(
        raw: Zeroizing<Vec<u8>>,
        algorithm: AesKeyAlgorithm,
        extractable: bool,
        usages: KeyUsages,
    ) -> CryptoKey {
        CryptoKey {
            handle: Handle::Secret(Arc::new(raw)),
            algorithm: KeyAlgorithm::Aes(algorithm),
            key_type: KeyType::Secret,
            extractable: extractable,
            usages: usages,
        }
    }

    pub fn algorithm(&self) -> &KeyAlgorithm {
        &self.algorithm
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn extractable(&self) -> bool {
        self.extractable
    }

    pub fn usages(&self) -> KeyUsages {
        self.usages
    }

    pub(crate) fn rsa_handle(&self) -> Result<Arc<KeyHandle>> {
        match &self.handle {
            Handle::Rsa(h) => Ok(h.clone()),
            Handle::Secret(_) => role_err!("not an RSA key"),
        }
    }

    pub(crate) fn secret(&self) -> Result<&[u8]> {
        match &self.handle {
            Handle::Secret(s) => Ok(s.as_slice()),
            Handle::Rsa(_) => role_err!("not a secret key"),
        }
    }

    pub(crate) fn check_extractable(&self) -> Result<()> {
        if !self.extractable {
            return role_err!("key is not extractable");
        }
        Ok(())
    }
}

/// The two halves of a generated key, the public half only holds the
/// public numbers
#[derive(Clone, Debug)]
pub struct CryptoKeyPair {
    pub public_key: CryptoKey,
    pub private_key: CryptoKey,
}
