/// サブスクリプションストア
///
/// アクティブユーザーのサブスクリプション／カテゴリー集合の正規で
/// 権威的なインメモリビューを保持します。コレクションはこのストアの
/// 操作を通じてのみ変更され、各操作はゲートウェイ呼び出し後に
/// ローカル状態を突き合わせます。
///
/// ストアはセッション（ユーザー）ごとに明示的に構築するオブジェクト
/// であり、モジュールレベルの暗黙のシングルトンは持ちません。
///
/// # 並行性
/// 各操作は`idle → in-flight → {success, failed}`の状態遷移を持つ
/// 非同期の中断点です。ストア内部で操作の直列化は行わないため、
/// 同時実行された操作は自然に競合します（例: 遅いfetchの全置換が
/// 速いcreateの追記を上書きする）。厳密な順序が必要な呼び出し側は
/// 自分で直列化してください。状態ロックはawaitをまたいで保持しません。
use crate::features::categories::api::CategoryApi;
use crate::features::categories::models::{Category, CreateCategoryDto};
use crate::features::subscriptions::api::SubscriptionApi;
use crate::features::subscriptions::models::{
    CreateSubscriptionDto, Subscription, SubscriptionStats, UpdateSubscriptionDto,
};
use crate::features::subscriptions::{normalize, summary};
use crate::shared::api_client::ApiClient;
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard};

/// ストア状態の読み取り専用スナップショット
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub subscriptions: Vec<Subscription>,
    pub categories: Vec<Category>,
    pub loading: bool,
    pub error: Option<String>,
}

/// 状態変更の通知を受け取るリスナー
pub type StoreListener = Box<dyn Fn(&StoreSnapshot) + Send + Sync>;

/// ストアの内部状態
#[derive(Debug, Default)]
struct StoreState {
    subscriptions: Vec<Subscription>,
    categories: Vec<Category>,
    loading: bool,
    error: Option<String>,
}

/// サブスクリプションストア本体
pub struct SubscriptionStore {
    client: ApiClient,
    state: Mutex<StoreState>,
    listeners: Mutex<Vec<StoreListener>>,
}

impl SubscriptionStore {
    /// 環境変数の設定で新しいストアを作成
    pub fn new() -> AppResult<Self> {
        Ok(Self::with_client(ApiClient::new()?))
    }

    /// API設定を指定してストアを作成
    ///
    /// # 引数
    /// * `config` - API設定
    pub fn with_config(config: ApiConfig) -> AppResult<Self> {
        Ok(Self::with_client(ApiClient::with_config(config)?))
    }

    /// APIクライアントを指定してストアを作成
    pub fn with_client(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(StoreState::default()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// 状態ロックを取得する（ポイズン時は内部値を回収する）
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 現在の状態のスナップショットを取得
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state();
        StoreSnapshot {
            subscriptions: state.subscriptions.clone(),
            categories: state.categories.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// 状態変更リスナーを登録する
    ///
    /// # 引数
    /// * `listener` - 変更後のスナップショットを受け取るリスナー
    pub fn subscribe(&self, listener: StoreListener) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    /// 登録済みリスナーへ変更を通知する
    fn notify(&self) {
        let snapshot = self.snapshot();
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for listener in listeners.iter() {
            listener(&snapshot);
        }
    }

    /// 操作の開始（in-flight状態へ遷移）
    fn begin(&self) {
        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }
        self.notify();
    }

    /// 操作の成功（状態を変更してsuccessへ遷移）
    fn finish_ok<F: FnOnce(&mut StoreState)>(&self, apply: F) {
        {
            let mut state = self.state();
            apply(&mut state);
            state.loading = false;
        }
        self.notify();
    }

    /// 操作の失敗（コレクションは変更せず、エラーを記録してfailedへ遷移）
    fn finish_err(&self, error: &AppError) {
        warn!("ストア操作が失敗しました: {}", error.details());
        {
            let mut state = self.state();
            state.error = Some(error.user_message().to_string());
            state.loading = false;
        }
        self.notify();
    }

    // --- サブスクリプション操作 ---

    /// ユーザーのサブスクリプションを取得してローカル集合を全置換する
    ///
    /// 成功時はサーバーレスポンス（正規化済み）でコレクションを
    /// 丸ごと置き換える（マージしない）。これにより前のユーザーの
    /// 残留エントリや、リモートで失敗した楽観的追記がローカルに
    /// 残らないことを保証する。失敗時は直前に取得済みの集合を
    /// そのまま保持する（空にはしない）。
    ///
    /// # 引数
    /// * `user_id` - ユーザーID
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー（エラースロットにも記録される）
    pub async fn fetch_subscriptions(&self, user_id: &str) -> AppResult<()> {
        if user_id.is_empty() {
            debug!("ユーザーIDが空のため、サブスクリプション取得をスキップします");
            return Ok(());
        }

        self.begin();

        let api = SubscriptionApi::new(&self.client);
        match api.list_by_user(user_id).await {
            Ok(records) => {
                let normalized: Vec<Subscription> =
                    records.iter().map(normalize::to_subscription).collect();
                info!(
                    "サブスクリプション集合を置換します: user_id={user_id}, count={}",
                    normalized.len()
                );
                self.finish_ok(|state| state.subscriptions = normalized);
                Ok(())
            }
            Err(e) => {
                self.finish_err(&e);
                Err(e)
            }
        }
    }

    /// サブスクリプションを作成してローカル集合へ追記する
    ///
    /// 追記はサーバーレスポンス（サーバー発行ID付き）を正規化した
    /// レコードで行い、メモリ上の別の複製は使わない。
    ///
    /// # 引数
    /// * `dto` - サブスクリプション作成用DTO
    ///
    /// # 戻り値
    /// 正規化された作成済みレコード、または失敗時はエラー
    pub async fn create_subscription(
        &self,
        dto: CreateSubscriptionDto,
    ) -> AppResult<Subscription> {
        self.begin();

        let api = SubscriptionApi::new(&self.client);
        match api.create(&dto).await {
            Ok(record) => {
                let subscription = normalize::to_subscription(&record);
                let appended = subscription.clone();
                self.finish_ok(|state| state.subscriptions.push(appended));
                Ok(subscription)
            }
            Err(e) => {
                self.finish_err(&e);
                Err(e)
            }
        }
    }

    /// サブスクリプションを更新する
    ///
    /// ゲートウェイが更新を受理した後、ローカルではIDで既存レコードを
    /// 探し、受理済みフィールドを最後に取得した完全なレコードへ浅く
    /// マージして再正規化し、その場で置き換える。サーバーの部分
    /// レスポンスでの置換は行わないため、更新で省略したフィールドは
    /// 保持される。ローカルに該当IDがない場合はローカル変更なしで
    /// 成功とする。
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    /// * `dto` - 受理された更新フィールド（`user_id`は型レベルで除外）
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー（ローカル状態は変更されない）
    pub async fn update_subscription(
        &self,
        id: &str,
        dto: UpdateSubscriptionDto,
    ) -> AppResult<()> {
        self.begin();

        let api = SubscriptionApi::new(&self.client);
        match api.update(id, &dto).await {
            Ok(_) => {
                self.finish_ok(|state| {
                    if let Some(index) = state
                        .subscriptions
                        .iter()
                        .position(|sub| sub.id.as_deref() == Some(id))
                    {
                        let merged = normalize::apply_update(&state.subscriptions[index], &dto);
                        state.subscriptions[index] = merged;
                    }
                });
                Ok(())
            }
            Err(e) => {
                self.finish_err(&e);
                Err(e)
            }
        }
    }

    /// サブスクリプションを削除する
    ///
    /// ローカルからの除去はゲートウェイが削除を確認した後にのみ行う。
    ///
    /// # 引数
    /// * `id` - サブスクリプションID
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー（ローカル状態は変更されない）
    pub async fn delete_subscription(&self, id: &str) -> AppResult<()> {
        self.begin();

        let api = SubscriptionApi::new(&self.client);
        match api.delete(id).await {
            Ok(()) => {
                self.finish_ok(|state| {
                    state
                        .subscriptions
                        .retain(|sub| sub.id.as_deref() != Some(id));
                });
                Ok(())
            }
            Err(e) => {
                self.finish_err(&e);
                Err(e)
            }
        }
    }

    /// サーバーサイド集計の統計を取得する
    ///
    /// クライアント側Aggregatorとは独立した参考値。取得に失敗した
    /// 場合は警告ログを出してゼロ値の統計を返す（エラーにはしない）。
    ///
    /// # 引数
    /// * `user_id` - ユーザーID
    ///
    /// # 戻り値
    /// サーバー集計の統計値（失敗時はゼロ値）
    pub async fn fetch_stats(&self, user_id: &str) -> SubscriptionStats {
        let api = SubscriptionApi::new(&self.client);
        match api.stats(user_id).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("統計の取得に失敗しました（ゼロ値を返します）: {}", e.details());
                SubscriptionStats::default()
            }
        }
    }

    // --- カテゴリー操作 ---

    /// ユーザーのカテゴリーを取得してローカル集合を全置換する
    ///
    /// # 引数
    /// * `user_id` - ユーザーID
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー（エラースロットにも記録される）
    pub async fn fetch_categories(&self, user_id: &str) -> AppResult<()> {
        if user_id.is_empty() {
            debug!("ユーザーIDが空のため、カテゴリー取得をスキップします");
            return Ok(());
        }

        self.begin();

        let api = CategoryApi::new(&self.client);
        match api.list_by_user(user_id).await {
            Ok(records) => {
                let normalized: Vec<Category> =
                    records.iter().map(normalize::to_category).collect();
                self.finish_ok(|state| state.categories = normalized);
                Ok(())
            }
            Err(e) => {
                self.finish_err(&e);
                Err(e)
            }
        }
    }

    /// カテゴリーを作成してローカル集合へ追記する
    ///
    /// # 引数
    /// * `dto` - カテゴリー作成用DTO
    ///
    /// # 戻り値
    /// 正規化された作成済みカテゴリー、または失敗時はエラー
    pub async fn create_category(&self, dto: CreateCategoryDto) -> AppResult<Category> {
        self.begin();

        let api = CategoryApi::new(&self.client);
        match api.create(&dto).await {
            Ok(record) => {
                let category = normalize::to_category(&record);
                let appended = category.clone();
                self.finish_ok(|state| state.categories.push(appended));
                Ok(category)
            }
            Err(e) => {
                self.finish_err(&e);
                Err(e)
            }
        }
    }

    /// カテゴリーを削除する
    ///
    /// # 引数
    /// * `id` - カテゴリーID
    ///
    /// # 戻り値
    /// 成功時はOk(())、失敗時はエラー（ローカル状態は変更されない）
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        self.begin();

        let api = CategoryApi::new(&self.client);
        match api.delete(id).await {
            Ok(()) => {
                self.finish_ok(|state| {
                    state.categories.retain(|cat| cat.id.as_deref() != Some(id));
                });
                Ok(())
            }
            Err(e) => {
                self.finish_err(&e);
                Err(e)
            }
        }
    }

    // --- 導出値（読み取りのたびに再計算される） ---

    /// 現在のサブスクリプション集合
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.state().subscriptions.clone()
    }

    /// 現在のカテゴリー集合
    pub fn categories(&self) -> Vec<Category> {
        self.state().categories.clone()
    }

    /// 実行中の操作があるか
    pub fn loading(&self) -> bool {
        self.state().loading
    }

    /// 直近の操作エラー
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// 月額サブスクリプションの合計金額
    pub fn monthly_total(&self) -> f64 {
        summary::monthly_total(&self.state().subscriptions)
    }

    /// 年額サブスクリプションの合計金額
    pub fn yearly_total(&self) -> f64 {
        summary::yearly_total(&self.state().subscriptions)
    }

    /// まもなく請求されるサブスクリプションの一覧（現在時刻基準）
    pub fn upcoming_payments(&self) -> Vec<Subscription> {
        summary::upcoming_payments(&self.state().subscriptions, Utc::now())
    }

    /// 財務サマリー（現在時刻基準）
    pub fn summary(&self) -> summary::SubscriptionSummary {
        summary::summarize(&self.state().subscriptions, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn unreachable_store() -> SubscriptionStore {
        // 接続不能なエンドポイントを指すストア（失敗経路のテスト用）
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 1,
        };
        SubscriptionStore::with_config(config).expect("テスト用ストアの構築に失敗")
    }

    #[test]
    fn test_snapshot_starts_empty_and_idle() {
        let store = unreachable_store();
        let snapshot = store.snapshot();

        assert!(snapshot.subscriptions.is_empty());
        assert!(snapshot.categories.is_empty());
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test]
    async fn test_fetch_with_empty_user_id_is_noop() {
        let store = unreachable_store();
        assert!(store.fetch_subscriptions("").await.is_ok());
        assert!(!store.loading());
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_failed_fetch_preserves_collection_and_records_error() {
        let store = unreachable_store();

        let result = store.fetch_subscriptions("user-1").await;
        assert!(result.is_err());

        // 失敗してもコレクションは変更されず、エラースロットに記録されること
        assert!(store.subscriptions().is_empty());
        assert!(store.error().is_some());
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_failed_fetch_stats_returns_zeros() {
        let store = unreachable_store();
        let stats = store.fetch_stats("user-1").await;
        assert_eq!(stats, SubscriptionStats::default());
    }

    #[tokio::test]
    async fn test_listeners_notified_on_state_changes() {
        let store = unreachable_store();
        let notified = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&notified);
        store.subscribe(Box::new(move |_snapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        // in-flight遷移とfailed遷移の2回通知されること
        let _ = store.fetch_subscriptions("user-1").await;
        assert_eq!(notified.load(Ordering::SeqCst), 2);
    }
}
