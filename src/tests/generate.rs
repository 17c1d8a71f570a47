// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use crate::tests::*;

use serial_test::parallel;

#[tokio::test]
#[parallel]
async fn test_generate_sizes() {
    let provider = RsaProvider::default();
    for (name, bits, exponent) in [
        (RSASSA_PKCS1_V1_5, 256, vec![1, 0, 1]),
        (RSA_PSS, 512, vec![3]),
        (RSA_OAEP, 1024, vec![0, 1, 0, 1]),
    ] {
        let usages = if name == RSA_OAEP {
            OAEP_USAGES
        } else {
            SIGN_USAGES
        };
        let params = gen_params(name, bits, &exponent, Some("SHA-1"));
        let pair = ret_or_panic!(
            provider.generate_key(&params, false, usages).await
        );

        for key in [&pair.public_key, &pair.private_key] {
            let alg = key.algorithm().as_rsa().unwrap();
            assert_eq!(alg.variant.name(), name);
            assert_eq!(alg.modulus_length, bits);
            let start = exponent.iter().position(|b| *b != 0).unwrap();
            assert_eq!(alg.public_exponent, exponent[start..].to_vec());
            assert_eq!(alg.hash, Some(HashAlg::Sha1));
        }
        assert_eq!(pair.public_key.key_type(), KeyType::Public);
        assert_eq!(pair.private_key.key_type(), KeyType::Private);
        /* the public half carries no private material at all */
        assert!(!ret_or_panic!(pair.public_key.rsa_handle()).is_private());
        assert!(ret_or_panic!(pair.private_key.rsa_handle()).is_private());
        assert!(pair.public_key.extractable());
        assert!(!pair.private_key.extractable());
    }
}

#[tokio::test]
#[parallel]
async fn test_generate_role_usages() {
    let pair = &*PSS_KEYS;
    assert_eq!(pair.public_key.usages(), KeyUsages::VERIFY);
    assert_eq!(pair.private_key.usages(), KeyUsages::SIGN);

    let pair = &*OAEP_KEYS;
    assert_eq!(
        pair.public_key.usages(),
        KeyUsages::ENCRYPT | KeyUsages::WRAP_KEY
    );
    assert_eq!(
        pair.private_key.usages(),
        KeyUsages::DECRYPT | KeyUsages::UNWRAP_KEY
    );
    assert_eq!(
        pair.private_key.usages().names(),
        vec!["decrypt", "unwrapKey"]
    );
}

#[tokio::test]
#[parallel]
async fn test_generate_bad_params() {
    let provider = RsaProvider::default();

    let params = gen_params(RSA_PSS, 255, &[1, 0, 1], Some("SHA-256"));
    assert_rejected!(
        provider.generate_key(&params, true, SIGN_USAGES),
        ErrorKind::Parameter
    );

    let params = gen_params(RSA_PSS, 16385, &[1, 0, 1], Some("SHA-256"));
    assert_rejected!(
        provider.generate_key(&params, true, SIGN_USAGES),
        ErrorKind::Parameter
    );

    /* 65539 */
    let params = gen_params(RSA_PSS, 2048, &[1, 0, 3], Some("SHA-256"));
    assert_rejected!(
        provider.generate_key(&params, true, SIGN_USAGES),
        ErrorKind::Parameter
    );

    let mut params = gen_params(RSA_OAEP, 2048, &[1, 0, 1], Some("SHA-256"));
    params.modulus_length = None;
    assert_rejected!(
        provider.generate_key(&params, true, OAEP_USAGES),
        ErrorKind::Parameter
    );

    let params = gen_params(RSA_OAEP, 2048, &[1, 0, 1], Some("MD5"));
    assert_rejected!(
        provider.generate_key(&params, true, OAEP_USAGES),
        ErrorKind::Parameter
    );

    /* encryption usages on a signature key */
    let params = gen_params(RSA_PSS, 2048, &[1, 0, 1], Some("SHA-256"));
    assert_rejected!(
        provider.generate_key(&params, true, KeyUsages::ENCRYPT),
        ErrorKind::Parameter
    );

    let params = gen_params("RSA-KEM", 2048, &[1, 0, 1], Some("SHA-256"));
    assert_rejected!(
        provider.generate_key(&params, true, SIGN_USAGES),
        ErrorKind::NotSupported
    );
}

#[tokio::test]
#[parallel]
async fn test_generate_configured_bounds() {
    let config = ret_or_panic!(Config::from_str(
        "[rsa]\nmin_modulus_bits = 1024\nmax_modulus_bits = 2048\n"
    ));
    let provider = ret_or_panic!(RsaProvider::new(config));

    let params = gen_params(RSASSA_PKCS1_V1_5, 512, &[3], Some("SHA-256"));
    assert_rejected!(
        provider.generate_key(&params, true, SIGN_USAGES),
        ErrorKind::Parameter
    );

    let params = gen_params(RSASSA_PKCS1_V1_5, 1024, &[3], None);
    let pair =
        ret_or_panic!(provider.generate_key(&params, true, SIGN_USAGES).await);
    assert_eq!(pair.private_key.algorithm().as_rsa().unwrap().hash, None);
}

#[tokio::test]
#[parallel]
async fn test_generate_inline() {
    let config = ret_or_panic!(Config::from_str("[rsa]\noffload = false\n"));
    let provider = ret_or_panic!(RsaProvider::new(config));
    let params = gen_params(RSA_OAEP, 512, &[1, 0, 1], Some("SHA-1"));
    let completion = provider.generate_key(&params, true, OAEP_USAGES);
    /* without offloading the work is done by the time the call returns */
    assert!(completion.is_resolved());
    let pair = ret_or_panic!(completion.await);
    assert_eq!(pair.public_key.algorithm().name(), RSA_OAEP);
}

#[test]
#[parallel]
fn test_generate_without_runtime() {
    /* no tokio runtime: the completion resolves inline */
    let provider = RsaProvider::default();
    let params = gen_params(RSA_PSS, 512, &[1, 0, 1], Some("SHA-256"));
    let completion = provider.generate_key(&params, true, SIGN_USAGES);
    assert!(completion.is_resolved());
}
