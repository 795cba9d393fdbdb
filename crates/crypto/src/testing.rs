//! # テスト用証明書生成
//!
//! P-384鍵で自己署名したX.509証明書を生成する。
//! 他クレートのテストからは `test-helpers` フィーチャーで利用する。

use std::str::FromStr;

use der::Encode;
use p384::ecdsa::signature::Signer;
use x509_cert::Certificate;

/// 指定したCNを持つ自己署名P-384証明書を生成する。
pub fn self_signed_certificate(common_name: &str, serial: u8) -> Certificate {
    let signing_key = p384::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
    let pubkey_sec1 = signing_key.verifying_key().to_sec1_bytes();

    let spki_oid = der::asn1::ObjectIdentifier::new_unwrap("1.2.840.10045.2.1"); // id-ecPublicKey
    let curve_oid = der::asn1::ObjectIdentifier::new_unwrap("1.3.132.0.34"); // secp384r1
    let spki = x509_cert::spki::SubjectPublicKeyInfoOwned {
        algorithm: x509_cert::spki::AlgorithmIdentifierOwned {
            oid: spki_oid,
            parameters: Some(der::asn1::Any::from(&curve_oid)),
        },
        subject_public_key: der::asn1::BitString::from_bytes(&pubkey_sec1).unwrap(),
    };

    let sig_alg = x509_cert::spki::AlgorithmIdentifierOwned {
        oid: der::asn1::ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3"), // ecdsa-with-SHA384
        parameters: None,
    };

    let name = x509_cert::name::Name::from_str(&format!("CN={common_name}")).unwrap();

    let validity = x509_cert::time::Validity {
        not_before: x509_cert::time::Time::GeneralTime(
            der::asn1::GeneralizedTime::from_date_time(
                der::DateTime::new(2020, 1, 1, 0, 0, 0).unwrap(),
            ),
        ),
        not_after: x509_cert::time::Time::GeneralTime(
            der::asn1::GeneralizedTime::from_date_time(
                der::DateTime::new(2049, 12, 31, 23, 59, 59).unwrap(),
            ),
        ),
    };

    let tbs = x509_cert::TbsCertificate {
        version: x509_cert::certificate::Version::V3,
        serial_number: x509_cert::serial_number::SerialNumber::new(&[serial]).unwrap(),
        signature: sig_alg.clone(),
        issuer: name.clone(),
        validity,
        subject: name,
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    };

    let tbs_der = tbs.to_der().unwrap();
    let sig: p384::ecdsa::DerSignature = signing_key.sign(&tbs_der);

    Certificate {
        tbs_certificate: tbs,
        signature_algorithm: sig_alg,
        signature: der::asn1::BitString::from_bytes(sig.as_bytes()).unwrap(),
    }
}

/// CNの列から証明書チェーン（連番シリアル）を生成する。
pub fn certificate_chain(common_names: &[&str]) -> Vec<Certificate> {
    common_names
        .iter()
        .enumerate()
        .map(|(i, cn)| self_signed_certificate(cn, i as u8 + 1))
        .collect()
}
