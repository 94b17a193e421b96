use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 請求サイクル（月額または年額）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

/// 対応通貨（固定セット、デフォルトはUSD）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Rub,
    Gbp,
    Jpy,
}

/// 正規カテゴリ（固定9値の列挙）
///
/// 自由入力のカテゴリラベルはNormalizerでこの列挙に写像される。
/// 写像できない場合はカテゴリなし（None）として扱い、エラーにはしない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionCategory {
    Streaming,
    Work,
    Music,
    Games,
    Other,
    Financial,
    Shopping,
    Education,
    Health,
}

impl SubscriptionCategory {
    /// 正規カテゴリ名の文字列表現を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionCategory::Streaming => "streaming",
            SubscriptionCategory::Work => "work",
            SubscriptionCategory::Music => "music",
            SubscriptionCategory::Games => "games",
            SubscriptionCategory::Other => "other",
            SubscriptionCategory::Financial => "financial",
            SubscriptionCategory::Shopping => "shopping",
            SubscriptionCategory::Education => "education",
            SubscriptionCategory::Health => "health",
        }
    }

    /// 正規カテゴリ名から列挙値を取得
    ///
    /// # 引数
    /// * `s` - 正規カテゴリ名（すでに整形済みであること）
    ///
    /// # 戻り値
    /// 対応する列挙値、または正規カテゴリ名でない場合はNone
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "streaming" => Some(SubscriptionCategory::Streaming),
            "work" => Some(SubscriptionCategory::Work),
            "music" => Some(SubscriptionCategory::Music),
            "games" => Some(SubscriptionCategory::Games),
            "other" => Some(SubscriptionCategory::Other),
            "financial" => Some(SubscriptionCategory::Financial),
            "shopping" => Some(SubscriptionCategory::Shopping),
            "education" => Some(SubscriptionCategory::Education),
            "health" => Some(SubscriptionCategory::Health),
            _ => None,
        }
    }

    /// 全正規カテゴリのリスト
    pub fn all() -> [SubscriptionCategory; 9] {
        [
            SubscriptionCategory::Streaming,
            SubscriptionCategory::Work,
            SubscriptionCategory::Music,
            SubscriptionCategory::Games,
            SubscriptionCategory::Other,
            SubscriptionCategory::Financial,
            SubscriptionCategory::Shopping,
            SubscriptionCategory::Education,
            SubscriptionCategory::Health,
        ]
    }
}

/// サブスクリプションデータモデル（正規化済み）
///
/// `billing_date`がNoneの場合は「請求日未定」の有効な状態を表す。
/// 解析不能な日付はNormalizerでNoneに正規化され、不正な日付として
/// 伝播することはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Option<String>,           // サーバー発行ID（永続化前はNone）
    pub user_id: String,              // 所有ユーザーID
    pub name: String,                 // サービス名
    pub price: f64,                   // 非負の金額
    pub currency: Currency,           // 通貨（デフォルトUSD）
    pub cycle: BillingCycle,          // 請求サイクル
    pub billing_date: Option<DateTime<Utc>>, // 次回請求日（未定の場合はNone）
    pub reminder_days: u8,            // リマインダー日数（1、3、7のいずれか）
    pub category: Option<SubscriptionCategory>, // 正規カテゴリ（未分類の場合はNone）
    pub created_at: Option<DateTime<Utc>>, // 参考情報
    pub updated_at: Option<DateTime<Utc>>, // 参考情報
}

/// サブスクリプション作成用DTO
///
/// ゲートウェイはこのフィールドのみを送信する
/// （`{userId, name, price, billingDate, serviceLogo}`）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionDto {
    pub user_id: String,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_logo: Option<String>,
}

/// サブスクリプション更新用DTO
///
/// 更新操作が受け付けるフィールドのみを持つ。`user_id`は型レベルで
/// 除外されており、更新で書き換えることはできない。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_logo: Option<String>,
}

/// サーバーサイド集計の統計レスポンス
///
/// クライアント側のAggregatorとは独立した参考値であり、両者の
/// 整合は取らない（どちらも権威的なビューではない）。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStats {
    pub total_monthly: f64,
    pub total_yearly: f64,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_subscription_serialization() {
        let sub = Subscription {
            id: Some("abc123".to_string()),
            user_id: "user-1".to_string(),
            name: "Netflix".to_string(),
            price: 15.99,
            currency: Currency::Usd,
            cycle: BillingCycle::Monthly,
            billing_date: Some(Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap()),
            reminder_days: 3,
            category: Some(SubscriptionCategory::Streaming),
            created_at: None,
            updated_at: None,
        };

        let json = serde_json::to_string(&sub).unwrap();
        assert!(json.contains("\"userId\":\"user-1\""));
        assert!(json.contains("\"cycle\":\"monthly\""));
        assert!(json.contains("\"currency\":\"USD\""));
        assert!(json.contains("\"category\":\"streaming\""));

        let deserialized: Subscription = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, sub);
    }

    #[test]
    fn test_update_dto_omits_unset_fields() {
        // 未指定フィールドはワイヤ形式から除外されること
        let dto = UpdateSubscriptionDto {
            price: Some(19.99),
            ..Default::default()
        };

        let json = serde_json::to_string(&dto).unwrap();
        assert_eq!(json, "{\"price\":19.99}");
    }

    #[test]
    fn test_create_dto_wire_shape() {
        // ゲートウェイが送信するのは契約上のフィールドのみであること
        let dto = CreateSubscriptionDto {
            user_id: "user-1".to_string(),
            name: "Spotify".to_string(),
            price: 9.99,
            billing_date: None,
            service_logo: None,
        };

        let json = serde_json::to_value(&dto).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("userId"));
        assert!(obj.contains_key("name"));
        assert!(obj.contains_key("price"));
    }

    #[test]
    fn test_category_parse_roundtrip() {
        for cat in SubscriptionCategory::all() {
            assert_eq!(SubscriptionCategory::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(SubscriptionCategory::parse("podcast"), None);
    }

    #[test]
    fn test_stats_deserialization() {
        let json = "{\"totalMonthly\":25.98,\"totalYearly\":99.0,\"count\":3}";
        let stats: SubscriptionStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_monthly, 25.98);
        assert_eq!(stats.total_yearly, 99.0);
        assert_eq!(stats.count, 3);
    }
}
