// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! JSON Web Key mapping for RSA keys (RFC 7517 / RFC 7518)

use crate::algorithm::{HashAlg, RsaVariant};
use crate::error::{Error, Result};
use crate::format_err;
use crate::key::{CryptoKey, KeyType};
use crate::native::rsa::{RsaComponents, RsaPrivateComponents};

use data_encoding::BASE64URL_NOPAD;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct JsonWebKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
}

impl JsonWebKey {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<JsonWebKey> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }
}

/// Derives the JWK `alg` tag for a variant and hash
pub fn jwk_alg(variant: RsaVariant, hash: HashAlg) -> String {
    match variant {
        RsaVariant::Pkcs1v15 => format!("RS{}", hash.suffix()),
        RsaVariant::Pss => format!("PS{}", hash.suffix()),
        RsaVariant::Oaep => match hash {
            HashAlg::Sha1 => "RSA-OAEP".to_string(),
            _ => format!("RSA-OAEP-{}", hash.suffix()),
        },
    }
}

fn encode(data: &[u8]) -> Option<String> {
    Some(BASE64URL_NOPAD.encode(data))
}

fn decode(field: &Option<String>, name: &str) -> Result<Vec<u8>> {
    match field {
        Some(v) => match BASE64URL_NOPAD.decode(v.as_bytes()) {
            Ok(d) => Ok(d),
            Err(e) => Err(Error::format(format!(
                "JWK field {} is not valid base64url: {}",
                name, e
            ))),
        },
        None => format_err!("JWK field {} is missing", name),
    }
}

/// Builds the JWK for `key`, the private numbers are included only for
/// private keys
pub fn export_jwk(key: &CryptoKey) -> Result<JsonWebKey> {
    let alg = match key.algorithm().as_rsa() {
        Some(a) => a,
        None => return format_err!("not an RSA key"),
    };
    let handle = key.rsa_handle()?;
    let private = key.key_type() == KeyType::Private;
    let c = handle.components(private)?;
    let mut jwk = JsonWebKey {
        kty: Some("RSA".to_string()),
        alg: alg.hash.map(|h| jwk_alg(alg.variant, h)),
        n: encode(&c.n),
        e: encode(&c.e),
        key_ops: Some(key.usages().names()),
        ext: Some(key.extractable()),
        ..Default::default()
    };
    if let Some(p) = &c.private {
        jwk.d = encode(&p.d);
        jwk.p = encode(&p.p);
        jwk.q = encode(&p.q);
        jwk.dp = encode(&p.dp);
        jwk.dq = encode(&p.dq);
        jwk.qi = encode(&p.qi);
    }
    Ok(jwk)
}

/// Decodes the numeric JWK fields, the presence of `d` makes it a
/// private key
pub fn import_jwk(jwk: &JsonWebKey) -> Result<RsaComponents> {
    match &jwk.kty {
        Some(kty) if kty != "RSA" => {
            return format_err!("unexpected JWK key type: {}", kty)
        }
        _ => (),
    }
    let mut c = RsaComponents {
        n: decode(&jwk.n, "n")?,
        e: decode(&jwk.e, "e")?,
        private: None,
    };
    if jwk.is_private() {
        c.private = Some(RsaPrivateComponents {
            d: decode(&jwk.d, "d")?,
            p: decode(&jwk.p, "p")?,
            q: decode(&jwk.q, "q")?,
            dp: decode(&jwk.dp, "dp")?,
            dq: decode(&jwk.dq, "dq")?,
            qi: decode(&jwk.qi, "qi")?,
        });
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn alg_tags() {
        assert_eq!(jwk_alg(RsaVariant::Pkcs1v15, HashAlg::Sha256), "RS256");
        assert_eq!(jwk_alg(RsaVariant::Pkcs1v15, HashAlg::Sha1), "RS1");
        assert_eq!(jwk_alg(RsaVariant::Pss, HashAlg::Sha512), "PS512");
        assert_eq!(jwk_alg(RsaVariant::Oaep, HashAlg::Sha1), "RSA-OAEP");
        assert_eq!(
            jwk_alg(RsaVariant::Oaep, HashAlg::Sha384),
            "RSA-OAEP-384"
        );
    }

    #[test]
    fn decode_fields() {
        let jwk = JsonWebKey::from_json(
            r#"{"kty":"RSA","n":"AQAB_-8","e":"AQAB","ext":true}"#,
        )
        .unwrap();
        assert!(!jwk.is_private());
        let c = import_jwk(&jwk).unwrap();
        assert_eq!(c.n, vec![0x01, 0x00, 0x01, 0xff, 0xef]);
        assert_eq!(c.e, vec![0x01, 0x00, 0x01]);
        assert!(c.private.is_none());

        let json = jwk.to_json().unwrap();
        assert!(!json.contains("\"d\""));
        assert_eq!(JsonWebKey::from_json(&json).unwrap(), jwk);
    }

    #[test]
    fn malformed_jwk() {
        let mut jwk = JsonWebKey {
            n: Some("AQAB".to_string()),
            e: Some("AQ+B".to_string()),
            ..Default::default()
        };
        assert_eq!(import_jwk(&jwk).unwrap_err().kind(), ErrorKind::Format);

        jwk.e = None;
        assert_eq!(import_jwk(&jwk).unwrap_err().kind(), ErrorKind::Format);

        jwk.e = Some("AQAB".to_string());
        jwk.kty = Some("EC".to_string());
        assert_eq!(import_jwk(&jwk).unwrap_err().kind(), ErrorKind::Format);

        jwk.kty = None;
        jwk.d = Some("AQAB".to_string());
        assert_eq!(import_jwk(&jwk).unwrap_err().kind(), ErrorKind::Format);

        let err = JsonWebKey::from_json("{\"n\": 12}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
