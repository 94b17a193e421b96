/// サブスクリプションリソースのリモートゲートウェイ
///
/// （リソース, 操作）の組ごとに1メソッドを提供します。レスポンスは
/// 生のJSONのまま返し、正規化はNormalizerに委ねます。読み込み系は
/// `ApiClient`のリクエスト単位タイムアウト（既定7秒）で制限されます。
use crate::features::subscriptions::models::{
    CreateSubscriptionDto, SubscriptionStats, UpdateSubscriptionDto,
};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use log::info;
use serde_json::Value;

/// サブスクリプションAPIゲートウェイ
pub struct SubscriptionApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SubscriptionApi<'a> {
    /// 新しいサブスクリプションゲートウェイを作成
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// ユーザーのサブスクリプション一覧を取得する
    ///
    /// サーバー側で請求日昇順にソート済みの配列が返る。
    ///
    /// # 引数
    /// * `user_id` - ユーザーID
    ///
    /// # 戻り値
    /// 生のサブスクリプションレコードの配列、または失敗時はエラー
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Value>> {
        let endpoint = format!("/subscriptions/{user_id}");
        let records: Vec<Value> = self.client.get(&endpoint).await?;

        info!(
            "サブスクリプション一覧取得成功: user_id={user_id}, count={}",
            records.len()
        );
        Ok(records)
    }

    /// サブスクリプションを作成する
    ///
    /// 送信するのは契約上のフィールドのみ
    /// （`{userId, name, price, billingDate, serviceLogo}`）。
    ///
    /// # 引数
    /// * `dto` - サブスクリプション作成用DTO
    ///
    /// # 戻り値
    /// サーバー発行IDを含む生の作成済みレコード、または失敗時はエラー
    pub async fn create(&self, dto: &CreateSubscriptionDto) -> AppResult<Value> {
        let record: Value = self.client.post("/subscriptions", dto).await?;

        info!("サブスクリプション作成成功: name={}", dto.name);
        Ok(record)
    }

    /// サブスクリプションを更新する
    ///
    /// この操作のフィールドのみを送信する（`{name, price, billingDate,
    /// serviceLogo}`）。`userId`など無関係なフィールドは転送しない。
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    /// * `dto` - サブスクリプション更新用DTO
    ///
    /// # 戻り値
    /// 生の更新レスポンス、未知のIDの場合はNotFoundエラー
    pub async fn update(&self, id: &str, dto: &UpdateSubscriptionDto) -> AppResult<Value> {
        let endpoint = format!("/subscriptions/{id}");
        let record: Value = self.client.put(&endpoint, dto).await?;

        info!("サブスクリプション更新成功: subscription_id={id}");
        Ok(record)
    }

    /// サブスクリプションを削除する
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    ///
    /// # 戻り値
    /// 成功時はOk(())、未知のIDの場合はNotFoundエラー
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let endpoint = format!("/subscriptions/{id}");
        self.client.delete(&endpoint).await?;

        info!("サブスクリプション削除成功: subscription_id={id}");
        Ok(())
    }

    /// サーバーサイド集計の統計を取得する
    ///
    /// # 引数
    /// * `user_id` - ユーザーID
    ///
    /// # 戻り値
    /// サーバー集計の統計値、または失敗時はエラー
    pub async fn stats(&self, user_id: &str) -> AppResult<SubscriptionStats> {
        let endpoint = format!("/subscriptions/{user_id}/stats");
        let stats: SubscriptionStats = self.client.get(&endpoint).await?;

        info!(
            "統計取得成功: user_id={user_id}, monthly={}, yearly={}, count={}",
            stats.total_monthly, stats.total_yearly, stats.count
        );
        Ok(stats)
    }
}
