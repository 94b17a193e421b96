/// 汎用APIクライアント
///
/// APIサーバーとの通信を行う汎用的なクライアント
/// サブスクリプション、カテゴリーの各エンドポイントで使用可能
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIサーバーからのエラーレスポンス
///
/// バックエンドは `{"error": "..."}` 形式でエラーを返す
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// 汎用APIクライアント
///
/// 読み込み系リクエストにはリクエスト単位のタイムアウトを設定し、
/// 超過時はそのリクエストのみを中断して`AppError::Timeout`を返す。
/// 自動リトライは行わない。
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// 環境変数の設定で新しいAPIクライアントを作成
    pub fn new() -> AppResult<Self> {
        let config = ApiConfig::from_env();
        Self::with_config(config)
    }

    /// 設定を指定してAPIクライアントを作成
    ///
    /// # 引数
    /// * `config` - API設定
    ///
    /// # 戻り値
    /// APIクライアント、または設定が不正な場合はエラー
    pub fn with_config(config: ApiConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let client = Client::builder()
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// 読み込みタイムアウトを取得
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    /// GETリクエストを送信（読み込みタイムアウト付き）
    ///
    /// # 引数
    /// * `endpoint` - エンドポイントパス
    ///
    /// # 戻り値
    /// デシリアライズされたレスポンス、または失敗時はエラー
    pub async fn get<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        debug!("GETリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let request = self.client.get(&url).timeout(self.read_timeout());

        let response = self.send(request, "GET", endpoint).await?;
        self.parse_json(response, "GET", endpoint).await
    }

    /// POSTリクエストを送信
    ///
    /// # 引数
    /// * `endpoint` - エンドポイントパス
    /// * `body` - JSONボディ
    ///
    /// # 戻り値
    /// デシリアライズされたレスポンス、または失敗時はエラー
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!("POSTリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let request = self.client.post(&url).json(body);

        let response = self.send(request, "POST", endpoint).await?;
        self.parse_json(response, "POST", endpoint).await
    }

    /// PUTリクエストを送信
    ///
    /// # 引数
    /// * `endpoint` - エンドポイントパス
    /// * `body` - JSONボディ
    ///
    /// # 戻り値
    /// デシリアライズされたレスポンス、または失敗時はエラー
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!("PUTリクエスト送信: endpoint={endpoint}");

        let url = format!("{}{endpoint}", self.config.base_url);
        let request = self.client.put(&url).json(body);

        let response = self.send(request, "PUT", endpoint).await?;
        self.parse_json(response, "PUT", endpoint).await
    }

    /// DELETEリクエストを送信
    ///
    /// DELETEは通常レスポンスボディがないため、成功ステータスのみチェックする
    ///
    /// # 引数
    /// * `endpoint` - エンドポイントパス
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー
    pub async fn delete(&self, endpoint: &str) -> AppResult<()> {
        let url = format!("{}{endpoint}", self.config.base_url);
        debug!("DELETEリクエスト送信: endpoint={endpoint}, url={url}");

        let request = self.client.delete(&url);
        self.send(request, "DELETE", endpoint).await?;

        info!("DELETEリクエスト成功: endpoint={endpoint}");
        Ok(())
    }

    /// リクエストを送信し、ステータスを検査する
    ///
    /// タイムアウトはそのリクエストのみを中断し、`AppError::Timeout`として
    /// 区別して返す。非2xx応答はリソースと操作のコンテキスト付きエラーになる。
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        endpoint: &str,
    ) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("APIリクエストがタイムアウトしました: {method} {endpoint}");
                AppError::Timeout(format!("{method} {endpoint}"))
            } else {
                AppError::network(endpoint, method, &format!("接続に失敗しました: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // エラーボディの解析を試行（`{"error": "..."}` 形式）
        let detail = response
            .text()
            .await
            .ok()
            .and_then(|text| {
                serde_json::from_str::<ErrorResponse>(&text)
                    .map(|r| r.error)
                    .ok()
                    .or(Some(text))
            })
            .unwrap_or_default();

        warn!("APIサーバーエラー: {method} {endpoint} -> status={status}, detail={detail}");

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(format!("{method} {endpoint}: リソース")));
        }

        Err(AppError::network(
            endpoint,
            method,
            &format!("ステータス{status}: {detail}"),
        ))
    }

    /// 成功レスポンスのJSONボディをデシリアライズする
    async fn parse_json<T>(&self, response: Response, method: &str, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let result: T = response.json().await.map_err(|e| {
            AppError::network(endpoint, method, &format!("レスポンス解析エラー: {e}"))
        })?;

        info!("{method}リクエスト成功: endpoint={endpoint}");
        Ok(result)
    }
}
