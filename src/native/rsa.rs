// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! RSA engine backed by the RustCrypto `rsa` crate.
//!
//! The rest of the provider only sees [KeyHandle]: an immutable public or
//! private key with the primitive operations needed by the WebCrypto
//! algorithms. All the padding and big number math happens in here.

use std::fmt;

use crate::algorithm::{HashAlg, PublicExponent, MAX_MODULUS_BITS};
use crate::error::{Error, Result};
use crate::map_engine_err;
use crate::native::oaep;

use rand::thread_rng;
use rsa::pkcs8::{
    DecodePrivateKey, EncodePrivateKey, EncodePublicKey,
};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::pkcs1::der::Decode;
use rsa::pkcs1::RsaPublicKey as Pkcs1PublicKey;
use rsa::pkcs8::spki::SubjectPublicKeyInfoRef;
use rsa::{BigUint, Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use zeroize::Zeroize;

/* Runs $body with $d aliased to the digest type matching $hash */
macro_rules! with_digest {
    ($hash:expr, $d:ident => $body:expr) => {
        match $hash {
            HashAlg::Sha1 => {
                type $d = Sha1;
                $body
            }
            HashAlg::Sha224 => {
                type $d = Sha224;
                $body
            }
            HashAlg::Sha256 => {
                type $d = Sha256;
                $body
            }
            HashAlg::Sha384 => {
                type $d = Sha384;
                $body
            }
            HashAlg::Sha512 => {
                type $d = Sha512;
                $body
            }
        }
    };
}

fn digest(hash: HashAlg, data: &[u8]) -> Vec<u8> {
    with_digest!(hash, D => D::digest(data).to_vec())
}

/// Big endian encoding of the RSA key numbers, as found in a JWK
#[derive(Clone, Default)]
pub struct RsaComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
    pub private: Option<RsaPrivateComponents>,
}

impl fmt::Debug for RsaComponents {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RsaComponents")
            .field("n", &format_args!("{} bytes", self.n.len()))
            .field("e", &hex::encode(&self.e))
            .field("private", &self.private)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct RsaPrivateComponents {
    pub d: Vec<u8>,
    pub p: Vec<u8>,
    pub q: Vec<u8>,
    pub dp: Vec<u8>,
    pub dq: Vec<u8>,
    pub qi: Vec<u8>,
}

impl fmt::Debug for RsaPrivateComponents {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("RsaPrivateComponents { .. }")
    }
}

impl Drop for RsaPrivateComponents {
    fn drop(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qi.zeroize();
    }
}

fn new_public_key(n: &[u8], e: &[u8], ctx: &str) -> Result<RsaPublicKey> {
    map_engine_err!(
        RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(n),
            BigUint::from_bytes_be(e),
            usize::try_from(MAX_MODULUS_BITS)?,
        ),
        ctx
    )
}

/// Native key material, never mutated after creation
pub enum KeyHandle {
    Public(RsaPublicKey),
    Private(RsaPrivateKey),
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self {
            KeyHandle::Public(_) => "Public",
            KeyHandle::Private(_) => "Private",
        };
        write!(f, "KeyHandle::{}({} bits)", kind, self.modulus_bits())
    }
}

impl KeyHandle {
    pub fn generate(bits: u32, exponent: PublicExponent) -> Result<KeyHandle> {
        let exp = BigUint::from(exponent.value());
        let key = map_engine_err!(
            RsaPrivateKey::new_with_exp(
                &mut thread_rng(),
                usize::try_from(bits)?,
                &exp
            ),
            "RSA key generation failed"
        )?;
        Ok(KeyHandle::Private(key))
    }

    pub fn from_pkcs8_der(der: &[u8]) -> Result<KeyHandle> {
        let key = map_engine_err!(
            RsaPrivateKey::from_pkcs8_der(der),
            "PKCS#8 import failed"
        )?;
        Ok(KeyHandle::Private(key))
    }

    /// The SPKI is decoded here rather than by the engine, which caps
    /// public keys at 4096 bits
    pub fn from_spki_der(der: &[u8]) -> Result<KeyHandle> {
        const CTX: &str = "SPKI import failed";
        let spki = SubjectPublicKeyInfoRef::from_der(der)
            .map_err(|e| Error::engine(CTX, e.to_string()))?;
        spki.algorithm
            .assert_algorithm_oid(rsa::pkcs1::ALGORITHM_OID)
            .map_err(|e| Error::engine(CTX, e.to_string()))?;
        let pkcs1 =
            Pkcs1PublicKey::from_der(spki.subject_public_key.raw_bytes())
                .map_err(|e| Error::engine(CTX, e.to_string()))?;
        Ok(KeyHandle::Public(new_public_key(
            pkcs1.modulus.as_bytes(),
            pkcs1.public_exponent.as_bytes(),
            CTX,
        )?))
    }

    pub fn from_components(c: &RsaComponents) -> Result<KeyHandle> {
        let p = match &c.private {
            None => {
                let key = new_public_key(
                    &c.n,
                    &c.e,
                    "RSA public key import failed",
                )?;
                return Ok(KeyHandle::Public(key));
            }
            Some(p) => p,
        };
        let n = BigUint::from_bytes_be(&c.n);
        let e = BigUint::from_bytes_be(&c.e);
        let key = map_engine_err!(
            RsaPrivateKey::from_components(
                n,
                e,
                BigUint::from_bytes_be(&p.d),
                vec![BigUint::from_bytes_be(&p.p), BigUint::from_bytes_be(&p.q)],
            ),
            "RSA private key import failed"
        )?;
        /* the engine derives the CRT values itself, the ones supplied
         * must agree with them */
        let dp = BigUint::from_bytes_be(&p.dp);
        let dq = BigUint::from_bytes_be(&p.dq);
        let qi = BigUint::from_bytes_be(&p.qi);
        if key.dp() != Some(&dp)
            || key.dq() != Some(&dq)
            || key.crt_coefficient() != Some(qi)
        {
            return Err(Error::engine(
                "RSA private key import failed",
                "CRT parameters do not match the key",
            ));
        }
        Ok(KeyHandle::Private(key))
    }

    /// A public only handle for the same key
    pub fn to_public(&self) -> KeyHandle {
        KeyHandle::Public(self.public_key().clone())
    }

    pub fn is_private(&self) -> bool {
        matches!(self, KeyHandle::Private(_))
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        match self {
            KeyHandle::Public(k) => k,
            KeyHandle::Private(k) => k.as_ref(),
        }
    }

    fn private_key(&self) -> Result<&RsaPrivateKey> {
        match self {
            KeyHandle::Private(k) => Ok(k),
            KeyHandle::Public(_) => Err(Error::engine(
                "RSA private operation failed",
                "no private key material",
            )),
        }
    }

    pub fn modulus_bits(&self) -> u32 {
        u32::try_from(self.public_key().n().bits()).unwrap_or(u32::MAX)
    }

    pub fn public_exponent(&self) -> Vec<u8> {
        self.public_key().e().to_bytes_be()
    }

    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let doc = map_engine_err!(
            self.private_key()?.to_pkcs8_der(),
            "PKCS#8 export failed"
        )?;
        Ok(doc.as_bytes().to_vec())
    }

    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let doc = map_engine_err!(
            self.public_key().to_public_key_der(),
            "SPKI export failed"
        )?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Returns the key numbers, private ones only when `private` is set
    pub fn components(&self, private: bool) -> Result<RsaComponents> {
        let public = self.public_key();
        let mut c = RsaComponents {
            n: public.n().to_bytes_be(),
            e: public.e().to_bytes_be(),
            private: None,
        };
        if !private {
            return Ok(c);
        }
        let key = self.private_key()?;
        let primes = key.primes();
        if primes.len() != 2 {
            return Err(Error::engine(
                "RSA key export failed",
                "multi-prime keys are not supported",
            ));
        }
        let (dp, dq, qi) =
            match (key.dp(), key.dq(), key.crt_coefficient()) {
                (Some(dp), Some(dq), Some(qi)) => (dp, dq, qi),
                _ => {
                    return Err(Error::engine(
                        "RSA key export failed",
                        "CRT parameters unavailable",
                    ))
                }
            };
        c.private = Some(RsaPrivateComponents {
            d: key.d().to_bytes_be(),
            p: primes[0].to_bytes_be(),
            q: primes[1].to_bytes_be(),
            dp: dp.to_bytes_be(),
            dq: dq.to_bytes_be(),
            qi: qi.to_bytes_be(),
        });
        Ok(c)
    }

    /// PKCS#1 v1.5 signature when `salt_len` is None, PSS otherwise
    pub fn sign(
        &self,
        hash: HashAlg,
        salt_len: Option<usize>,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        let key = self.private_key()?;
        let hashed = digest(hash, data);
        let mut rng = thread_rng();
        let res = match salt_len {
            None => with_digest!(hash, D => key.sign_with_rng(
                &mut rng,
                Pkcs1v15Sign::new::<D>(),
                &hashed
            )),
            Some(len) => with_digest!(hash, D => key.sign_with_rng(
                &mut rng,
                Pss::new_with_salt::<D>(len),
                &hashed
            )),
        };
        map_engine_err!(res, "RSA sign failed")
    }

    /// A signature that does not verify is reported as `Ok(false)`
    pub fn verify(
        &self,
        hash: HashAlg,
        salt_len: Option<usize>,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let key = self.public_key();
        let hashed = digest(hash, data);
        let res = match salt_len {
            None => with_digest!(hash, D => key.verify(
                Pkcs1v15Sign::new::<D>(),
                &hashed,
                signature
            )),
            Some(len) => with_digest!(hash, D => key.verify(
                Pss::new_with_salt::<D>(len),
                &hashed,
                signature
            )),
        };
        match res {
            Ok(()) => Ok(true),
            Err(rsa::Error::Verification) => Ok(false),
            Err(e) => Err(Error::engine("RSA verify failed", e)),
        }
    }

    /// An absent label and an empty one are the same
    pub fn encrypt_oaep(
        &self,
        hash: HashAlg,
        label: Option<&[u8]>,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        let label = label.unwrap_or_default();
        with_digest!(hash, D => oaep::encrypt::<D>(
            self.public_key(),
            label,
            data
        ))
    }

    pub fn decrypt_oaep(
        &self,
        hash: HashAlg,
        label: Option<&[u8]>,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        let label = label.unwrap_or_default();
        with_digest!(hash, D => oaep::decrypt::<D>(
            self.private_key()?,
            label,
            data
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_roundtrip() {
        let handle = KeyHandle::generate(512, PublicExponent::F4).unwrap();
        assert_eq!(handle.modulus_bits(), 512);
        assert_eq!(handle.public_exponent(), vec![1, 0, 1]);

        let c = handle.components(true).unwrap();
        let imported = KeyHandle::from_components(&c).unwrap();
        assert!(imported.is_private());
        assert_eq!(imported.public_key(), handle.public_key());

        let mut bad = c.clone();
        if let Some(ref mut p) = bad.private {
            p.qi = vec![1];
        }
        assert!(KeyHandle::from_components(&bad).is_err());

        let public = handle.components(false).unwrap();
        assert!(public.private.is_none());
        let imported = KeyHandle::from_components(&public).unwrap();
        assert!(!imported.is_private());
        assert!(imported.to_pkcs8_der().is_err());
    }

    #[test]
    fn exponent_three() {
        let handle = KeyHandle::generate(512, PublicExponent::Three).unwrap();
        assert_eq!(handle.public_exponent(), vec![3]);
        let sig = handle.sign(HashAlg::Sha1, None, b"data").unwrap();
        assert!(handle.verify(HashAlg::Sha1, None, b"data", &sig).unwrap());
        assert!(!handle.verify(HashAlg::Sha1, None, b"dat", &sig).unwrap());
    }

    #[test]
    fn binary_oaep_label() {
        let handle = KeyHandle::generate(512, PublicExponent::F4).unwrap();
        let label = [0xff, 0x00, 0x80];
        let ct = handle
            .encrypt_oaep(HashAlg::Sha1, Some(&label[..]), b"payload")
            .unwrap();
        let pt = handle
            .decrypt_oaep(HashAlg::Sha1, Some(&label[..]), &ct)
            .unwrap();
        assert_eq!(pt, b"payload");
        assert!(handle
            .decrypt_oaep(HashAlg::Sha1, Some(&label[..2]), &ct)
            .is_err());
    }

    #[test]
    fn large_public_keys() {
        for len in [513, 2048] {
            let c = RsaComponents {
                n: vec![0xc5; len],
                e: vec![1, 0, 1],
                private: None,
            };
            let handle = KeyHandle::from_components(&c).unwrap();
            assert_eq!(handle.modulus_bits() as usize, len * 8);
            let der = handle.to_spki_der().unwrap();
            let imported = KeyHandle::from_spki_der(&der).unwrap();
            assert_eq!(imported.public_key(), handle.public_key());
        }
        let c = RsaComponents {
            n: vec![0xc5; 2049],
            e: vec![1, 0, 1],
            private: None,
        };
        assert!(KeyHandle::from_components(&c).is_err());
        assert!(KeyHandle::from_spki_der(&[0x30, 0x00]).is_err());
    }

    #[test]
    fn debug_hides_private_numbers() {
        let handle = KeyHandle::generate(512, PublicExponent::F4).unwrap();
        let c = handle.components(true).unwrap();
        let d = hex::encode(&c.private.as_ref().unwrap().d);
        let out = format!("{:?}", c);
        assert!(out.contains("RsaPrivateComponents { .. }"));
        assert!(!out.contains(&d));
        assert!(!format!("{:?}", handle.to_public()).contains("Private"));
    }
}
