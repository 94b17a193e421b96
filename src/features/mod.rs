/// 機能モジュール
pub mod categories;
pub mod subscriptions;
