/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - 緩い型付けのリモートレコードの正規化（Normalizer）
/// - リモートストアとのHTTP同期（ゲートウェイ）
/// - セッション内の権威的なインメモリビュー（ストア）
/// - 月額・年額合計と「まもなく請求」一覧の導出（Aggregator）
pub mod api;
pub mod models;
pub mod normalize;
pub mod store;
pub mod summary;

// 公開インターフェース
pub use api::SubscriptionApi;
pub use models::{
    BillingCycle, CreateSubscriptionDto, Currency, Subscription, SubscriptionCategory,
    SubscriptionStats, UpdateSubscriptionDto,
};
pub use normalize::{normalize_category, to_subscription};
pub use store::{StoreListener, StoreSnapshot, SubscriptionStore};
pub use summary::{
    monthly_total, summarize, upcoming_payments, yearly_total, SubscriptionSummary,
    UpcomingPayment,
};
