//! # vault-signer エラー型
//!
//! 全操作で共通のエラー型。呼び出し側は [`KeyVaultError::kind`] で
//! 設定・通信・パースの3分類を区別できる。

use vault_signer_crypto::CryptoError;

/// エラーの分類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 設定の欠落・不正（セッション構築時）
    Configuration,
    /// 通信・認証・サービス側の失敗
    Transport,
    /// レスポンスがスキーマに一致しない
    Parse,
}

/// vault-signerエラー型。
#[derive(Debug, thiserror::Error)]
pub enum KeyVaultError {
    /// 設定が欠落または不正
    #[error("設定エラー: {0}")]
    Configuration(String),
    /// HTTPクライアントの構築に失敗
    #[error("HTTPクライアントの構築に失敗: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// 接続拒否・タイムアウト等でリクエストが完了しなかった
    #[error("Vaultへのリクエストに失敗: {0}")]
    Request(#[source] reqwest::Error),
    /// Vaultが非2xxステータスを返した
    #[error("VaultがHTTP {status} を返しました: {}", .errors.join("; "))]
    Status { status: u16, errors: Vec<String> },
    /// レスポンスのフィールド欠落・型不一致・形式不正
    #[error("レスポンスのパースに失敗: {0}")]
    Parse(String),
    /// 証明書バンドルのパースに失敗
    #[error("証明書チェーンのパースに失敗: {0}")]
    Certificate(#[from] CryptoError),
    /// 署名のBase64デコードに失敗
    #[error("署名のBase64デコードに失敗: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl KeyVaultError {
    /// エラーの分類を返す。
    pub fn kind(&self) -> ErrorKind {
        match self {
            KeyVaultError::Configuration(_) | KeyVaultError::ClientBuild(_) => {
                ErrorKind::Configuration
            }
            KeyVaultError::Request(_) | KeyVaultError::Status { .. } => ErrorKind::Transport,
            KeyVaultError::Parse(_)
            | KeyVaultError::Certificate(_)
            | KeyVaultError::Base64(_) => ErrorKind::Parse,
        }
    }
}
