/// カテゴリー機能モジュール
///
/// ユーザー定義カテゴリーのデータモデルとリモートゲートウェイを提供します。
pub mod api;
pub mod models;

pub use api::CategoryApi;
pub use models::{Category, CreateCategoryDto};
