use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// ネットワーク関連のエラー（非2xx応答または転送エラー）
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// クライアント側タイムアウト（読み込み予算の超過）
    #[error("リクエストがタイムアウトしました: {0}")]
    Timeout(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Network(_) => "APIサーバーとの通信でエラーが発生しました",
            AppError::Timeout(_) => "読み込み中にリクエストがタイムアウトしました",
            AppError::NotFound(msg) => msg,
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Json(_) => "データ形式の解析でエラーが発生しました",
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// タイムアウトかどうかを判定
    ///
    /// # 戻り値
    /// クライアント側タイムアウトの場合はtrue
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Timeout(_))
    }

    /// ネットワークエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 対象リソース名
    /// * `verb` - 操作（GET/POST/PUT/DELETE）
    /// * `message` - エラーメッセージ
    ///
    /// # 戻り値
    /// ネットワークエラー
    pub fn network(resource: &str, verb: &str, message: &str) -> Self {
        AppError::Network(format!("{verb} {resource}: {message}"))
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    ///
    /// # 戻り値
    /// リソース未発見エラー
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 設定エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 設定エラーメッセージ
    ///
    /// # 戻り値
    /// 設定エラー
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// AppErrorからStringへの変換（ストアのエラースロットでの使用のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
