//! # Transit署名文字列のパース
//!
//! Transitエンジンは署名を `vault:v{鍵バージョン}:{Base64}` 形式で返す。
//! セグメント数を検証してから3番目のセグメントをデコードする。

use base64::Engine;

use crate::error::KeyVaultError;

/// Base64エンジン（Standard）
pub(crate) fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// パース済みのTransit署名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitSignature {
    /// 先頭セグメント（通常 `"vault"`）
    pub prefix: String,
    /// 鍵バージョンセグメント（例: `"v1"`）
    pub key_version: String,
    /// Base64エンコードされた署名本体
    pub payload: String,
}

impl TransitSignature {
    /// `:` 区切りの署名文字列をパースする。
    ///
    /// セグメントが3つ未満の場合は `Parse` エラー。
    /// 4つ以上ある場合も3番目のセグメントを本体とする。
    pub fn parse(signature: &str) -> Result<Self, KeyVaultError> {
        let segments: Vec<&str> = signature.split(':').collect();
        if segments.len() < 3 {
            return Err(KeyVaultError::Parse(format!(
                "署名文字列のセグメント数が不足しています（{}個、3個以上必要）",
                segments.len()
            )));
        }
        Ok(Self {
            prefix: segments[0].to_string(),
            key_version: segments[1].to_string(),
            payload: segments[2].to_string(),
        })
    }

    /// 鍵バージョンを数値で返す（`"v3"` → `Some(3)`）。
    pub fn key_version_number(&self) -> Option<u64> {
        self.key_version.strip_prefix('v')?.parse().ok()
    }

    /// 署名本体をBase64デコードした生バイト列を返す。
    pub fn decode(&self) -> Result<Vec<u8>, KeyVaultError> {
        Ok(b64().decode(&self.payload)?)
    }
}
