/// カテゴリーリソースのリモートゲートウェイ
///
/// （リソース, 操作）の組ごとに1メソッドを提供します。レスポンスは
/// 生のJSONのまま返し、正規化はNormalizerに委ねます。
use crate::features::categories::models::CreateCategoryDto;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use log::info;
use serde_json::Value;

/// カテゴリーAPIゲートウェイ
pub struct CategoryApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CategoryApi<'a> {
    /// 新しいカテゴリーゲートウェイを作成
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// ユーザーのカテゴリー一覧を取得する
    ///
    /// # 引数
    /// * `user_id` - ユーザーID
    ///
    /// # 戻り値
    /// 生のカテゴリーレコードの配列、または失敗時はエラー
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Value>> {
        let endpoint = format!("/categories/{user_id}");
        let records: Vec<Value> = self.client.get(&endpoint).await?;

        info!("カテゴリー一覧取得成功: user_id={user_id}, count={}", records.len());
        Ok(records)
    }

    /// カテゴリーを作成する
    ///
    /// # 引数
    /// * `dto` - カテゴリー作成用DTO
    ///
    /// # 戻り値
    /// サーバー発行IDを含む生の作成済みレコード、または失敗時はエラー
    pub async fn create(&self, dto: &CreateCategoryDto) -> AppResult<Value> {
        let record: Value = self.client.post("/categories", dto).await?;

        info!("カテゴリー作成成功: name={}", dto.name);
        Ok(record)
    }

    /// カテゴリーを削除する
    ///
    /// # 引数
    /// * `id` - カテゴリーID
    ///
    /// # 戻り値
    /// 成功時はOk(())、未知のIDの場合はNotFoundエラー
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let endpoint = format!("/categories/{id}");
        self.client.delete(&endpoint).await?;

        info!("カテゴリー削除成功: category_id={id}");
        Ok(())
    }
}
