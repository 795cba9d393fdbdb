//! # クライアントテスト用スタブVault
//!
//! 受信したリクエストを記録し、固定のレスポンスを返すHTTPサーバー。

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Json;

/// スタブが受信したリクエスト
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// 受信リクエストの記録
pub type Recorder = Arc<Mutex<Vec<RecordedRequest>>>;

/// 全パスで同じステータスとJSONを返すスタブVaultを起動する。
/// 戻り値はベースURLと受信記録。
pub async fn start_stub_vault(
    status: StatusCode,
    response: serde_json::Value,
) -> (String, Recorder) {
    let recorder: Recorder = Arc::new(Mutex::new(Vec::new()));
    let rec = recorder.clone();

    let app = axum::Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let rec = rec.clone();
            let response = response.clone();
            async move {
                rec.lock().unwrap().push(RecordedRequest {
                    method,
                    path: uri.path().to_string(),
                    token: headers
                        .get("x-vault-token")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                    body: serde_json::from_slice(&body).ok(),
                });
                (status, Json(response))
            }
        },
    );

    let base_url = serve(app).await;
    (base_url, recorder)
}

/// ルーターをランダムポートで起動し、ベースURLを返す。
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}")
}

/// 接続を受け付けないアドレスを返す。
pub async fn refused_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// KV v2読み取りレスポンスを組み立てる。
pub fn kv_response(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "request_id": "stub",
        "lease_id": "",
        "renewable": false,
        "data": {
            "data": data,
            "metadata": { "version": 1, "created_time": "2024-01-01T00:00:00Z", "destroyed": false }
        }
    })
}

/// Transit署名レスポンスを組み立てる。
pub fn sign_response(signature: &str) -> serde_json::Value {
    serde_json::json!({
        "request_id": "stub",
        "data": { "signature": signature, "key_version": 1 }
    })
}
