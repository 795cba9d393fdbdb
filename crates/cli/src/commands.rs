//! # CLIコマンド
//!
//! [`KeyVault`] 実装に対して各コマンドを実行し、標準出力に書く文字列を返す。

use anyhow::Context;
use base64::Engine;

use vault_signer_core::KeyVault;
use vault_signer_crypto::{encode_pem_chain, subject_name, LineEnding};

/// Base64エンジン（Standard）
fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// 証明書チェーンを取得し、PEMバンドルとして返す。
pub async fn certificate_chain(vault: &dyn KeyVault) -> anyhow::Result<String> {
    let certs = vault
        .certificate_chain()
        .await
        .with_context(|| format!("鍵 {} の証明書チェーン取得に失敗", vault.key_id()))?;

    if certs.is_empty() {
        tracing::warn!(key_id = vault.key_id(), "証明書チェーンが空です");
    }
    for (i, cert) in certs.iter().enumerate() {
        tracing::info!(index = i, subject = %subject_name(cert), "証明書");
    }

    Ok(encode_pem_chain(&certs, LineEnding::LF)?)
}

/// ダイジェストに署名し、署名をBase64（改行付き）で返す。
pub async fn sign(
    vault: &dyn KeyVault,
    encoded_digest: &str,
    algorithm: &str,
) -> anyhow::Result<String> {
    let signature = vault
        .sign(encoded_digest, algorithm)
        .await
        .with_context(|| format!("鍵 {} での署名に失敗", vault.key_id()))?;

    Ok(format!("{}\n", b64().encode(signature)))
}

/// コマンドライン引数からBase64エンコード済みダイジェストを得る。
///
/// 16進指定の場合はデコードしてBase64に変換する。Base64指定はそのまま使う。
pub fn encoded_digest(
    digest: Option<String>,
    digest_hex: Option<String>,
) -> anyhow::Result<String> {
    match (digest, digest_hex) {
        (Some(b64_digest), None) => Ok(b64_digest),
        (None, Some(hex_digest)) => {
            let bytes = hex::decode(hex_digest.trim())
                .context("--digest-hex は16進文字列である必要があります")?;
            Ok(b64().encode(bytes))
        }
        _ => anyhow::bail!("--digest と --digest-hex のどちらか一方を指定してください"),
    }
}
