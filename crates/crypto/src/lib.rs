//! # vault-signer 証明書処理
//!
//! Vaultから取得した証明書バンドルをX.509証明書列にパースする。
//!
//! ## 入力形式
//! | 形式 | 判定 | 結果 |
//! |------|------|------|
//! | PEM | `-----BEGIN ` を含む | ブロック順の証明書列 |
//! | DER | それ以外 | 連結されたDER証明書の列 |
//! | 空 | 空白のみ | 空の証明書列 |

use der::{Decode, DecodePem, EncodePem, Reader, SliceReader};

pub use der::pem::LineEnding;
pub use x509_cert::Certificate;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

const PEM_BEGIN: &str = "-----BEGIN ";
const PEM_END: &str = "-----END ";

/// 証明書処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// PEMブロックのパースに失敗
    #[error("PEM証明書のパースに失敗: {0}")]
    PemParseError(String),
    /// DER証明書のパースに失敗
    #[error("DER証明書のパースに失敗: {0}")]
    DerParseError(String),
    /// PEMエンコードに失敗
    #[error("PEMエンコードに失敗: {0}")]
    PemEncodeError(String),
}

/// 証明書バンドルをパースし、出現順の証明書列を返す。
///
/// PEMブロックを含む場合はPEMとして、含まない場合は連結DERとして扱う。
/// ブロック間のテキストは無視する。空白のみの入力は空の列を返す。
pub fn parse_certificates(data: &[u8]) -> Result<Vec<Certificate>, CryptoError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    if contains(data, PEM_BEGIN.as_bytes()) {
        parse_pem_bundle(data)
    } else {
        parse_der_sequence(data)
    }
}

/// 証明書列をPEMバンドル（改行区切り）にエンコードする。
pub fn encode_pem_chain(
    certs: &[Certificate],
    line_ending: LineEnding,
) -> Result<String, CryptoError> {
    let mut out = String::new();
    for (i, cert) in certs.iter().enumerate() {
        let pem = cert
            .to_pem(line_ending)
            .map_err(|e| CryptoError::PemEncodeError(format!("証明書[{i}]: {e}")))?;
        out.push_str(&pem);
    }
    Ok(out)
}

/// 証明書のSubjectをRFC 4514形式の文字列で返す。
pub fn subject_name(cert: &Certificate) -> String {
    cert.tbs_certificate.subject.to_string()
}

// ─────────────────────────────────────────────
// 内部関数
// ─────────────────────────────────────────────

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// PEMブロックを先頭から順に切り出してデコードする。
fn parse_pem_bundle(data: &[u8]) -> Result<Vec<Certificate>, CryptoError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| CryptoError::PemParseError(format!("UTF-8ではありません: {e}")))?;

    let mut certs = Vec::new();
    let mut rest = text;
    while let Some(begin) = rest.find(PEM_BEGIN) {
        let block = &rest[begin..];
        let end = block.find(PEM_END).ok_or_else(|| {
            CryptoError::PemParseError(format!("ブロック[{}]の終端行が見つかりません", certs.len()))
        })?;
        // 終端行の改行直前まで。行末の空白・CRは除く
        let end_line = &block[end..];
        let block_len = end + end_line.find('\n').unwrap_or(end_line.len());
        let pem = block[..block_len].trim_end_matches(|c: char| matches!(c, '\r' | ' ' | '\t'));

        let cert = Certificate::from_pem(pem.as_bytes())
            .map_err(|e| CryptoError::PemParseError(format!("ブロック[{}]: {e}", certs.len())))?;
        certs.push(cert);
        rest = &block[block_len..];
    }
    Ok(certs)
}

/// 連結されたDER証明書を順にデコードする。
fn parse_der_sequence(data: &[u8]) -> Result<Vec<Certificate>, CryptoError> {
    let mut reader =
        SliceReader::new(data).map_err(|e| CryptoError::DerParseError(e.to_string()))?;

    let mut certs = Vec::new();
    while !reader.is_finished() {
        let cert = Certificate::decode(&mut reader)
            .map_err(|e| CryptoError::DerParseError(format!("証明書[{}]: {e}", certs.len())))?;
        certs.push(cert);
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Encode;

    /// 単一証明書のPEMをパースできることを確認
    #[test]
    fn test_parse_single_pem() {
        let cert = testing::self_signed_certificate("leaf.example", 1);
        let pem = encode_pem_chain(&[cert.clone()], LineEnding::LF).unwrap();

        let parsed = parse_certificates(pem.as_bytes()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], cert);
        assert_eq!(subject_name(&parsed[0]), "CN=leaf.example");
    }

    /// 複数証明書のPEMバンドルで順序と件数が保たれることを確認
    #[test]
    fn test_parse_pem_bundle_preserves_order() {
        let chain = testing::certificate_chain(&["leaf", "intermediate", "root"]);
        let pem = encode_pem_chain(&chain, LineEnding::LF).unwrap();

        let parsed = parse_certificates(pem.as_bytes()).unwrap();
        assert_eq!(parsed, chain);
    }

    /// CRLF改行とブロック間のテキストを許容することを確認
    #[test]
    fn test_parse_pem_bundle_crlf_with_comments() {
        let chain = testing::certificate_chain(&["a", "b"]);
        let first = chain[0].to_pem(LineEnding::CRLF).unwrap();
        let second = chain[1].to_pem(LineEnding::CRLF).unwrap();
        let bundle = format!("# leaf\r\n{first}\r\n# issuer\r\n{second}");

        let parsed = parse_certificates(bundle.as_bytes()).unwrap();
        assert_eq!(parsed, chain);
    }

    /// 終端行の後ろに空白・タブが続いても受理することを確認
    #[test]
    fn test_parse_pem_bundle_trailing_whitespace() {
        let chain = testing::certificate_chain(&["leaf", "root"]);
        let bundle: String = chain
            .iter()
            .map(|cert| {
                let pem = cert.to_pem(LineEnding::LF).unwrap();
                pem.replace("-----END CERTIFICATE-----\n", "-----END CERTIFICATE-----  \t\n")
            })
            .collect();

        let parsed = parse_certificates(bundle.as_bytes()).unwrap();
        assert_eq!(parsed, chain);

        let crlf = bundle.replace('\n', "\r\n");
        assert_eq!(parse_certificates(crlf.as_bytes()).unwrap(), chain);
    }

    /// 連結DERをパースできることを確認
    #[test]
    fn test_parse_der_sequence() {
        let chain = testing::certificate_chain(&["leaf", "root"]);
        let mut der = Vec::new();
        for cert in &chain {
            der.extend(cert.to_der().unwrap());
        }

        let parsed = parse_certificates(&der).unwrap();
        assert_eq!(parsed, chain);
    }

    /// 空入力は空の証明書列になることを確認
    #[test]
    fn test_parse_empty() {
        assert!(parse_certificates(b"").unwrap().is_empty());
        assert!(parse_certificates(b" \n").unwrap().is_empty());
    }

    /// 壊れたPEMはエラーになることを確認
    #[test]
    fn test_parse_corrupted_pem() {
        let data = b"-----BEGIN CERTIFICATE-----\nbm90IGEgY2VydA==\n-----END CERTIFICATE-----\n";
        let result = parse_certificates(data);
        assert!(matches!(result, Err(CryptoError::PemParseError(_))));
    }

    /// 終端行の無いPEMはエラーになることを確認
    #[test]
    fn test_parse_unterminated_pem() {
        let data = b"-----BEGIN CERTIFICATE-----\nMIIB\n";
        let result = parse_certificates(data);
        assert!(matches!(result, Err(CryptoError::PemParseError(_))));
    }

    /// PEMでもDERでもない入力はエラーになることを確認
    #[test]
    fn test_parse_garbage() {
        let result = parse_certificates(b"not a certificate");
        assert!(matches!(result, Err(CryptoError::DerParseError(_))));
    }
}
