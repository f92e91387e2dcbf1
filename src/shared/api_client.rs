/// 汎用APIクライアント
///
/// APIサーバーとの通信を行うクライアント
/// サブスクリプションの遠隔保存で使用する
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIサーバーからのエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

/// 汎用APIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// 環境設定からAPIクライアントを作成
    pub fn from_env() -> AppResult<Self> {
        Self::new_with_config(ApiConfig::from_env()?)
    }

    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(config: ApiConfig) -> AppResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// 接続先のベースURL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// APIサーバーがlocalhostかどうかを判定
    pub fn is_localhost(&self) -> bool {
        self.config.base_url.contains("localhost") || self.config.base_url.contains("127.0.0.1")
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    /// 認証トークンがある場合はAuthorizationヘッダーを付与する
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let request = self.authorize(self.client.get(self.url(endpoint)));
        let response = self.send_with_retry(request, "GET", endpoint).await?;
        Self::parse_json(response).await
    }

    /// POSTリクエストを送信
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信: endpoint={endpoint}");

        let request = self.authorize(self.client.post(self.url(endpoint)).json(body));
        let response = self.send_with_retry(request, "POST", endpoint).await?;
        Self::parse_json(response).await
    }

    /// PUTリクエストを送信
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("PUTリクエスト送信: endpoint={endpoint}");

        let request = self.authorize(self.client.put(self.url(endpoint)).json(body));
        let response = self.send_with_retry(request, "PUT", endpoint).await?;
        Self::parse_json(response).await
    }

    /// DELETEリクエストを送信
    ///
    /// DELETEは通常レスポンスボディがないため、成功ステータスのみ確認する
    pub async fn delete(&self, endpoint: &str) -> AppResult<()> {
        info!("DELETEリクエスト送信: endpoint={endpoint}");

        let request = self.authorize(self.client.delete(self.url(endpoint)));
        self.send_with_retry(request, "DELETE", endpoint).await?;
        Ok(())
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("レスポンス解析エラー: {e}")))
    }

    /// リトライ機能付きでリクエストを送信
    ///
    /// 接続エラーのみ指数バックオフで再試行し、HTTPエラーは即座に返す
    async fn send_with_retry(
        &self,
        request: RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> AppResult<Response> {
        let mut attempts = 0;
        loop {
            let cloned_request = request.try_clone().ok_or_else(|| {
                AppError::ExternalService("リクエストのクローンに失敗しました".to_string())
            })?;

            match cloned_request.send().await {
                Ok(response) if response.status().is_success() => {
                    info!("{method}リクエスト成功: endpoint={endpoint}");
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    let error_response = self.handle_error_response(response).await;
                    return Err(Self::status_error(status, error_response));
                }
                Err(e) => {
                    if attempts < self.config.max_retries {
                        attempts += 1;
                        let delay = Duration::from_secs(2_u64.pow(attempts));
                        warn!(
                            "APIリクエスト失敗、リトライします: attempt={attempts}/{}, delay={delay:?}",
                            self.config.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AppError::ExternalService(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    fn status_error(status: StatusCode, error_response: ErrorResponse) -> AppError {
        match status {
            StatusCode::NOT_FOUND => AppError::NotFound(error_response.error.message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::Validation(error_response.error.message)
            }
            _ => AppError::ExternalService(format!(
                "APIサーバーエラー: {} - {}",
                error_response.error.code, error_response.error.message
            )),
        }
    }

    /// エラーレスポンスを処理し、詳細なエラー情報を提供
    async fn handle_error_response(&self, response: Response) -> ErrorResponse {
        let status_code = response.status().as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| "レスポンス読み取り失敗".to_string());

        if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
            debug!(
                "APIサーバーから構造化エラーレスポンスを受信: code={}, message={}",
                error_response.error.code, error_response.error.message
            );
            return error_response;
        }

        let (error_code, user_message) = match status_code {
            400 => ("BAD_REQUEST", "リクエストの形式が正しくありません"),
            401 => ("UNAUTHORIZED", "認証に失敗しました。APIトークンを確認してください"),
            403 => ("FORBIDDEN", "この操作を実行する権限がありません"),
            404 => ("NOT_FOUND", "指定されたリソースが見つかりません"),
            422 => ("UNPROCESSABLE_ENTITY", "入力内容に誤りがあります"),
            429 => (
                "TOO_MANY_REQUESTS",
                "リクエストが多すぎます。しばらく待ってから再試行してください",
            ),
            500 => ("INTERNAL_SERVER_ERROR", "サーバー内部エラーが発生しました"),
            502 => ("BAD_GATEWAY", "APIサーバーとの通信でエラーが発生しました"),
            503 => ("SERVICE_UNAVAILABLE", "APIサーバーが一時的に利用できません"),
            504 => (
                "GATEWAY_TIMEOUT",
                "APIサーバーからの応答がタイムアウトしました",
            ),
            _ => ("UNKNOWN_ERROR", "不明なエラーが発生しました"),
        };

        warn!("APIサーバーから非構造化エラーレスポンス: status={status_code}, body={response_text}");

        let timestamp = chrono::Utc::now().to_rfc3339();
        ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message: user_message.to_string(),
                details: Some(serde_json::json!({
                    "http_status": status_code,
                    "raw_response": response_text,
                })),
                timestamp,
                request_id,
            },
        }
    }
}
