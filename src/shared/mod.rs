/// 共有モジュール
///
/// 機能モジュール間で共有される基盤を提供します：
/// - 汎用APIクライアント
/// - 環境・API設定
/// - 統一エラー型
pub mod api_client;
pub mod config;
pub mod errors;
