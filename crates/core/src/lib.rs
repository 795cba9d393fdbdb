//! # vault-signer Core
//!
//! HashiCorp Vaultに保管された鍵で署名するためのアダプター。
//! 秘密鍵はVault外に取り出さない。
//!
//! ## 操作
//! 1. 証明書チェーン取得: KV v2から `certificate` フィールドを読み取り、X.509証明書列にパース
//! 2. Transit署名: ハッシュ済みダイジェストをTransitエンジンで署名し、生の署名バイト列を返す
//!
//! どちらも1回のHTTPリクエストで完結し、リトライ・キャッシュは行わない。
//!
//! ## エラー分類
//! | 分類 | 発生箇所 |
//! |------|---------|
//! | Configuration | セッション構築時の設定欠落・不正 |
//! | Transport | 通信失敗、認証拒否、Vaultのエラーステータス |
//! | Parse | レスポンスのフィールド欠落・型不一致・形式不正 |

pub mod client;
pub mod config;
pub mod error;
pub mod signature;

pub use client::{VaultClient, REQUEST_TIMEOUT};
pub use config::VaultConfig;
pub use error::{ErrorKind, KeyVaultError};
pub use signature::TransitSignature;
pub use vault_signer_crypto::Certificate;

/// リモート鍵による証明書取得と署名の抽象インターフェース。
///
/// 実装は1つの鍵IDに束縛される。
#[async_trait::async_trait]
pub trait KeyVault: Send + Sync {
    /// 操作対象の鍵ID
    fn key_id(&self) -> &str;

    /// 鍵に対応する証明書チェーンを取得する。
    async fn certificate_chain(&self) -> Result<Vec<Certificate>, KeyVaultError>;

    /// Base64エンコード済みのハッシュ済みダイジェストに署名する。
    async fn sign(
        &self,
        encoded_digest: &str,
        signature_algorithm: &str,
    ) -> Result<Vec<u8>, KeyVaultError>;
}
