//! # vault-signer 共有型定義
//!
//! Vault HTTP APIのリクエスト/レスポンスをRust構造体として提供する。
//! レスポンスは型付きスキーマで一度にデコードし、フィールド欠落や型不一致は
//! デコード境界で検出する。
//!
//! ## 対象API
//! | API | パス | 使用フィールド |
//! |-----|------|---------------|
//! | KV v2 読み取り | `GET /v1/{mount}/data/{path}` | `data.data.certificate` |
//! | Transit 署名 | `POST /v1/{mount}/sign/{name}` | `data.signature` |

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 共通エンベロープ
// ---------------------------------------------------------------------------

/// Vaultの標準レスポンスエンベロープ。
///
/// 本体は `data` フィールドに入る。その他のフィールド（`lease_id` 等）は使用しない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultResponse<T> {
    /// リクエストID（ログ用）
    #[serde(default)]
    pub request_id: String,
    /// レスポンス本体
    pub data: T,
    /// Vaultからの警告
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// Vaultのエラーレスポンス。
/// 非2xxステータス時に返される。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// KV v2
// ---------------------------------------------------------------------------

/// KV v2シークレットの読み取り結果（`data` フィールドの中身）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvV2Secret<T> {
    /// シークレット本体
    pub data: T,
    /// バージョン情報
    #[serde(default)]
    pub metadata: Option<KvV2Metadata>,
}

/// KV v2シークレットのメタデータ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KvV2Metadata {
    /// シークレットのバージョン
    #[serde(default)]
    pub version: Option<u64>,
    /// 作成時刻（RFC 3339）
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub destroyed: bool,
}

/// 証明書チェーンを保持するKVシークレット。
///
/// `certificate` にPEM（またはDER）バンドルの文字列を格納する。
/// それ以外のフィールドは無視する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateSecret {
    pub certificate: String,
}

// ---------------------------------------------------------------------------
// Transit
// ---------------------------------------------------------------------------

/// Transit署名のマーシャリング形式（ASN.1 DER）。
pub const MARSHALING_ALGORITHM_ASN1: &str = "asn1";

/// PSSソルト長ポリシー（ハッシュ長に一致）。
pub const SALT_LENGTH_HASH: &str = "hash";

/// Transit署名リクエスト。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitSignRequest {
    /// Base64エンコードされた入力（prehashed時はダイジェスト）
    pub input: String,
    /// 入力がハッシュ済みかどうか
    pub prehashed: bool,
    /// 署名のマーシャリング形式
    pub marshaling_algorithm: String,
    /// RSA-PSSのソルト長
    pub salt_length: String,
    /// 署名アルゴリズム（例: `"pss"`, `"pkcs1v15"`）
    pub signature_algorithm: String,
}

impl TransitSignRequest {
    /// ハッシュ済みダイジェストの署名リクエストを構築する。
    ///
    /// マーシャリング形式はASN.1、ソルト長は `"hash"` に固定される。
    pub fn prehashed(encoded_digest: &str, signature_algorithm: &str) -> Self {
        Self {
            input: encoded_digest.to_string(),
            prehashed: true,
            marshaling_algorithm: MARSHALING_ALGORITHM_ASN1.to_string(),
            salt_length: SALT_LENGTH_HASH.to_string(),
            signature_algorithm: signature_algorithm.to_string(),
        }
    }
}

/// Transit署名レスポンス（`data` フィールドの中身）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitSignResponse {
    /// `vault:v{N}:{base64}` 形式の署名
    pub signature: String,
    /// 署名に使用した鍵バージョン
    #[serde(default)]
    pub key_version: Option<u64>,
}
