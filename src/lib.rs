//! サブスクリプション管理コア
//!
//! ユーザーの定期的なサブスクリプション（金額、請求サイクル、次回
//! 請求日、カテゴリ）を追跡し、財務サマリー（月額・年額合計、
//! まもなく請求される支払い）を導出するクライアントサイドの
//! 状態管理レイヤーです。リモートストアとは最小限のREST契約で
//! 同期し、バックエンド実装差のあるデータをここで正規形へ揃えます。

// 機能モジュール構造
pub mod features;
pub mod shared;

pub use features::categories::{Category, CategoryApi, CreateCategoryDto};
pub use features::subscriptions::{
    BillingCycle, CreateSubscriptionDto, Currency, StoreSnapshot, Subscription, SubscriptionApi,
    SubscriptionCategory, SubscriptionStats, SubscriptionStore, SubscriptionSummary,
    UpdateSubscriptionDto,
};
pub use shared::api_client::ApiClient;
pub use shared::config::environment::{
    initialize_logging_system, load_environment_variables, ApiConfig,
};
pub use shared::errors::{AppError, AppResult};
