//! # Vaultクライアント
//!
//! 1つの鍵IDに束縛されたVaultセッション。
//!
//! ## 操作
//! | 操作 | リクエスト | 使用フィールド |
//! |------|-----------|---------------|
//! | [`VaultClient::get_certificate_chain`] | `GET /v1/{kv_mount}/data/{key_id}` | `data.data.certificate` |
//! | [`VaultClient::sign_with_transit`] | `POST /v1/{transit_mount}/sign/{key_id}` | `data.signature` |
//!
//! 各操作はHTTPリクエストを1回だけ送信し、リトライしない。
//! キャンセルはFutureのdropで行う。タイムアウトはクライアント構築時の30秒固定。

#[cfg(test)]
mod test_helpers;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;

use vault_signer_crypto::Certificate;
use vault_signer_types::{
    CertificateSecret, KvV2Secret, TransitSignRequest, TransitSignResponse, VaultErrorResponse,
    VaultResponse,
};

use crate::config::VaultConfig;
use crate::error::KeyVaultError;
use crate::signature::TransitSignature;
use crate::KeyVault;

/// リクエストタイムアウト
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 認証トークンを載せるヘッダー
const TOKEN_HEADER: &str = "X-Vault-Token";

/// 鍵IDに束縛されたVaultセッション。
///
/// 構築後は不変。`reqwest::Client` を内包するため安価にクローンでき、
/// 複数タスクから同時に使用できる。
#[derive(Debug, Clone)]
pub struct VaultClient {
    /// HTTPクライアント（トークンヘッダー・タイムアウト設定済み）
    http_client: reqwest::Client,
    /// VaultのベースURL
    base_url: Url,
    kv_mount: String,
    transit_mount: String,
    /// 全操作で使用する鍵ID（KVパス兼Transit鍵名）
    key_id: String,
}

impl VaultClient {
    /// 設定と鍵IDからセッションを構築する。
    ///
    /// ネットワーク通信は行わない。
    pub fn new(config: VaultConfig, key_id: impl Into<String>) -> Result<Self, KeyVaultError> {
        config.validate()?;

        let key_id = key_id.into();
        if key_id.trim_matches('/').is_empty() {
            return Err(KeyVaultError::Configuration("鍵IDが空です".to_string()));
        }

        let base_url = Url::parse(&config.address).map_err(|e| {
            KeyVaultError::Configuration(format!("Vaultアドレスが不正です ({}): {e}", config.address))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(KeyVaultError::Configuration(format!(
                "Vaultアドレスはhttp(s)のURLである必要があります: {}",
                config.address
            )));
        }

        let mut token = HeaderValue::from_str(&config.token).map_err(|_| {
            KeyVaultError::Configuration(
                "Vaultトークンにヘッダーで使用できない文字が含まれています".to_string(),
            )
        })?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(KeyVaultError::ClientBuild)?;

        tracing::debug!(address = %base_url, key_id = %key_id, "Vaultクライアントを構築");

        Ok(Self {
            http_client,
            base_url,
            kv_mount: config.kv_mount,
            transit_mount: config.transit_mount,
            key_id,
        })
    }

    /// 環境変数（`VAULT_ADDR`, `VAULT_TOKEN`）からセッションを構築する。
    pub fn from_env(key_id: impl Into<String>) -> Result<Self, KeyVaultError> {
        Self::new(VaultConfig::from_env()?, key_id)
    }

    /// セッションの鍵ID
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// KV v2から証明書チェーンを取得する。
    ///
    /// `certificate` フィールドの文字列をPEM（またはDER）バンドルとしてパースし、
    /// 出現順の証明書列を返す。
    pub async fn get_certificate_chain(&self) -> Result<Vec<Certificate>, KeyVaultError> {
        let url = self.endpoint(&self.kv_mount, "data")?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(KeyVaultError::Request)?;

        let secret: VaultResponse<KvV2Secret<CertificateSecret>> =
            read_data(response, "KVシークレットエンジンの証明書").await?;

        let certs =
            vault_signer_crypto::parse_certificates(secret.data.data.certificate.as_bytes())?;

        let metadata = secret.data.metadata.unwrap_or_default();
        tracing::info!(
            key_id = %self.key_id,
            request_id = %secret.request_id,
            count = certs.len(),
            secret_version = ?metadata.version,
            created_time = ?metadata.created_time,
            destroyed = metadata.destroyed,
            "証明書チェーンを取得"
        );
        Ok(certs)
    }

    /// Transitでハッシュ済みダイジェストに署名し、署名の生バイト列を返す。
    ///
    /// `encoded_digest` はBase64エンコード済みダイジェスト。
    /// マーシャリングはASN.1、ソルト長は `"hash"` 固定。
    pub async fn sign_with_transit(
        &self,
        encoded_digest: &str,
        signature_algorithm: &str,
    ) -> Result<Vec<u8>, KeyVaultError> {
        let url = self.endpoint(&self.transit_mount, "sign")?;
        let request = TransitSignRequest::prehashed(encoded_digest, signature_algorithm);
        let response = self
            .http_client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(KeyVaultError::Request)?;

        let signed: VaultResponse<TransitSignResponse> =
            read_data(response, "Transit署名レスポンス").await?;

        let signature = TransitSignature::parse(&signed.data.signature)?;
        let bytes = signature.decode()?;

        tracing::info!(
            key_id = %self.key_id,
            request_id = %signed.request_id,
            key_version = ?signed.data.key_version,
            signature_key_version = ?signature.key_version_number(),
            signature_algorithm,
            signature_len = bytes.len(),
            "Transitで署名"
        );
        Ok(bytes)
    }

    /// `{base}/v1/{mount}/{action}/{key_id}` を組み立てる。
    /// 各セグメントは個別にパーセントエンコードされる。
    fn endpoint(&self, mount: &str, action: &str) -> Result<Url, KeyVaultError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                KeyVaultError::Configuration(format!("Vaultアドレスが不正です: {}", self.base_url))
            })?
            .pop_if_empty()
            .push("v1")
            .extend(mount.split('/').filter(|s| !s.is_empty()))
            .push(action)
            .extend(self.key_id.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }
}

#[async_trait::async_trait]
impl KeyVault for VaultClient {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn certificate_chain(&self) -> Result<Vec<Certificate>, KeyVaultError> {
        self.get_certificate_chain().await
    }

    async fn sign(
        &self,
        encoded_digest: &str,
        signature_algorithm: &str,
    ) -> Result<Vec<u8>, KeyVaultError> {
        self.sign_with_transit(encoded_digest, signature_algorithm)
            .await
    }
}

/// レスポンスを読み取り、成功時は型付きスキーマにデコードする。
///
/// 非2xxは `Status`（Vaultの `errors` 配列付き）、デコード失敗は `Parse`。
async fn read_data<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<VaultResponse<T>, KeyVaultError> {
    let status = response.status();
    let body = response.bytes().await.map_err(KeyVaultError::Request)?;

    if !status.is_success() {
        let errors = serde_json::from_slice::<VaultErrorResponse>(&body)
            .map(|r| r.errors)
            .unwrap_or_default();
        tracing::warn!(status = status.as_u16(), ?errors, "Vaultがエラーを返しました");
        return Err(KeyVaultError::Status {
            status: status.as_u16(),
            errors,
        });
    }

    let decoded: VaultResponse<T> = serde_json::from_slice(&body)
        .map_err(|e| KeyVaultError::Parse(format!("{what}: {e}")))?;

    if let Some(warnings) = decoded.warnings.as_ref().filter(|w| !w.is_empty()) {
        tracing::warn!(request_id = %decoded.request_id, ?warnings, "Vaultからの警告");
    }
    Ok(decoded)
}
