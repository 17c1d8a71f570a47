// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! EME-OAEP (RFC 8017, 7.1) on top of the raw RSA primitive.
//!
//! The engine only takes UTF-8 labels; WebCrypto labels are arbitrary
//! octet strings, so the encoding is done here. MGF1 uses the same digest
//! as the label hash.

use crate::error::{Error, Result};
use crate::map_engine_err;

use rand::{thread_rng, RngCore};
use rsa::hazmat::{rsa_decrypt_and_check, rsa_encrypt};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::digest::{Digest, FixedOutputReset};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroizing;

const ENCRYPT_FAILED: &str = "RSA-OAEP encryption failed";
const DECRYPT_FAILED: &str = "RSA-OAEP decryption failed";

/// Xors `out` with MGF1(`seed`)
fn mgf1_xor<D: Digest + FixedOutputReset>(out: &mut [u8], seed: &[u8]) {
    let mut digest = D::new();
    let mut counter = 0u32;
    for chunk in out.chunks_mut(<D as Digest>::output_size()) {
        Digest::update(&mut digest, seed);
        Digest::update(&mut digest, counter.to_be_bytes());
        let mask = digest.finalize_reset();
        for (o, m) in chunk.iter_mut().zip(mask.iter()) {
            *o ^= *m;
        }
        counter = counter.wrapping_add(1);
    }
}

fn left_pad(data: &[u8], len: usize, ctx: &str) -> Result<Vec<u8>> {
    if data.len() > len {
        return Err(Error::engine(ctx, "integer larger than the modulus"));
    }
    let mut out = vec![0u8; len];
    out[len - data.len()..].copy_from_slice(data);
    Ok(out)
}

pub fn encrypt<D: Digest + FixedOutputReset>(
    key: &RsaPublicKey,
    label: &[u8],
    msg: &[u8],
) -> Result<Vec<u8>> {
    let k = key.size();
    let h_len = <D as Digest>::output_size();
    if msg.len() + 2 * h_len + 2 > k {
        return Err(Error::engine(ENCRYPT_FAILED, "message too long"));
    }

    /* EM = 0x00 || maskedSeed || maskedDB, DB = lHash || PS || 0x01 || M */
    let mut em = Zeroizing::new(vec![0u8; k]);
    let (seed, db) = em[1..].split_at_mut(h_len);
    thread_rng().fill_bytes(seed);
    let db_len = db.len();
    db[..h_len].copy_from_slice(&D::digest(label));
    db[db_len - msg.len() - 1] = 0x01;
    db[db_len - msg.len()..].copy_from_slice(msg);
    mgf1_xor::<D>(db, seed);
    mgf1_xor::<D>(seed, db);

    let m = Zeroizing::new(BigUint::from_bytes_be(&em));
    let c = map_engine_err!(rsa_encrypt(key, &m), ENCRYPT_FAILED)?;
    left_pad(&c.to_bytes_be(), k, ENCRYPT_FAILED)
}

pub fn decrypt<D: Digest + FixedOutputReset>(
    key: &RsaPrivateKey,
    label: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let k = key.size();
    let h_len = <D as Digest>::output_size();
    if ciphertext.len() != k || k < 2 * h_len + 2 {
        return Err(Error::engine(DECRYPT_FAILED, "invalid ciphertext length"));
    }

    let c = BigUint::from_bytes_be(ciphertext);
    let m = Zeroizing::new(map_engine_err!(
        rsa_decrypt_and_check(key, Some(&mut thread_rng()), &c),
        DECRYPT_FAILED
    )?);
    let mut em = Zeroizing::new(left_pad(
        &Zeroizing::new(m.to_bytes_be()),
        k,
        DECRYPT_FAILED,
    )?);

    /* every check below runs in constant time, only the final verdict
     * is branched on */
    let first_is_zero = em[0].ct_eq(&0u8);
    let (seed, db) = em[1..].split_at_mut(h_len);
    mgf1_xor::<D>(seed, db);
    mgf1_xor::<D>(db, seed);
    let hash_matches = db[..h_len].ct_eq(&D::digest(label)[..]);

    let mut looking = Choice::from(1u8);
    let mut nonzero_before_one = Choice::from(0u8);
    let mut index = 0u32;
    for (i, b) in db[h_len..].iter().enumerate() {
        let is_zero = b.ct_eq(&0u8);
        let is_one = b.ct_eq(&1u8);
        index.conditional_assign(&(i as u32), looking & is_one);
        looking &= !is_one;
        nonzero_before_one |= looking & !is_zero;
    }

    let valid = first_is_zero & hash_matches & !nonzero_before_one & !looking;
    if !bool::from(valid) {
        return Err(Error::engine(DECRYPT_FAILED, "decryption error"));
    }
    let start = h_len + usize::try_from(index)? + 1;
    Ok(db[start..].to_vec())
}
