//! # Vault接続設定
//!
//! 接続先アドレスと認証トークンを保持する明示的な設定レコード。
//! 環境変数からの読み込みは [`VaultConfig::from_env`] で行う。
//!
//! ## 環境変数
//! | 変数 | 必須 | 既定値 |
//! |------|------|--------|
//! | `VAULT_ADDR` | ○ | - |
//! | `VAULT_TOKEN` | ○ | - |
//! | `VAULT_KV_MOUNT` | - | `secret` |
//! | `VAULT_TRANSIT_MOUNT` | - | `transit` |

use std::fmt;

use crate::error::KeyVaultError;

/// Vaultアドレスの環境変数名
pub const ENV_VAULT_ADDR: &str = "VAULT_ADDR";
/// Vaultトークンの環境変数名
pub const ENV_VAULT_TOKEN: &str = "VAULT_TOKEN";
/// KV v2マウントパスの環境変数名
pub const ENV_VAULT_KV_MOUNT: &str = "VAULT_KV_MOUNT";
/// Transitマウントパスの環境変数名
pub const ENV_VAULT_TRANSIT_MOUNT: &str = "VAULT_TRANSIT_MOUNT";

/// KV v2シークレットエンジンの既定マウントパス
pub const DEFAULT_KV_MOUNT: &str = "secret";
/// Transitシークレットエンジンの既定マウントパス
pub const DEFAULT_TRANSIT_MOUNT: &str = "transit";

/// Vault接続設定。
#[derive(Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// VaultのベースURL（例: `https://vault.example.com:8200`）
    pub address: String,
    /// 認証トークン
    pub token: String,
    /// KV v2マウントパス
    pub kv_mount: String,
    /// Transitマウントパス
    pub transit_mount: String,
}

impl VaultConfig {
    /// アドレスとトークンから既定マウントの設定を作成する。
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            kv_mount: DEFAULT_KV_MOUNT.to_string(),
            transit_mount: DEFAULT_TRANSIT_MOUNT.to_string(),
        }
    }

    /// KV v2マウントパスを差し替える。
    pub fn with_kv_mount(mut self, mount: impl Into<String>) -> Self {
        self.kv_mount = mount.into();
        self
    }

    /// Transitマウントパスを差し替える。
    pub fn with_transit_mount(mut self, mount: impl Into<String>) -> Self {
        self.transit_mount = mount.into();
        self
    }

    /// プロセス環境変数から設定を読み込む。
    pub fn from_env() -> Result<Self, KeyVaultError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む。
    ///
    /// アドレス・トークンが未設定または空の場合は `Configuration` エラー。
    /// マウントパスは未設定・空なら既定値を使う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, KeyVaultError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let address = non_empty(ENV_VAULT_ADDR).ok_or_else(|| {
            KeyVaultError::Configuration(format!("{ENV_VAULT_ADDR} が設定されていません"))
        })?;
        let token = non_empty(ENV_VAULT_TOKEN).ok_or_else(|| {
            KeyVaultError::Configuration(format!("{ENV_VAULT_TOKEN} が設定されていません"))
        })?;

        let mut config = Self::new(address, token);
        if let Some(mount) = non_empty(ENV_VAULT_KV_MOUNT) {
            config.kv_mount = mount;
        }
        if let Some(mount) = non_empty(ENV_VAULT_TRANSIT_MOUNT) {
            config.transit_mount = mount;
        }
        Ok(config)
    }

    /// 必須項目を検証する。
    pub fn validate(&self) -> Result<(), KeyVaultError> {
        if self.address.is_empty() {
            return Err(KeyVaultError::Configuration(
                "Vaultアドレスが空です".to_string(),
            ));
        }
        if self.token.is_empty() {
            return Err(KeyVaultError::Configuration(
                "Vaultトークンが空です".to_string(),
            ));
        }
        if self.kv_mount.trim_matches('/').is_empty() {
            return Err(KeyVaultError::Configuration(
                "KVマウントパスが空です".to_string(),
            ));
        }
        if self.transit_mount.trim_matches('/').is_empty() {
            return Err(KeyVaultError::Configuration(
                "Transitマウントパスが空です".to_string(),
            ));
        }
        Ok(())
    }
}

// トークンはログに出さない
impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .field("kv_mount", &self.kv_mount)
            .field("transit_mount", &self.transit_mount)
            .finish()
    }
}
