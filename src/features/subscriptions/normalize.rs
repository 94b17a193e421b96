/// 正規化モジュール（Normalizer）
///
/// リモートストアから受信した緩い型付けのJSONレコードを正規の
/// `Subscription` / `Category` エンティティへ変換します。バックエンドの
/// 実装差（camelCase / snake_caseのフィールド名、自由入力のカテゴリ、
/// 解析不能な日付）をここで吸収し、下流には正規形のみを流します。
use crate::features::categories::models::Category;
use crate::features::subscriptions::models::{
    BillingCycle, Currency, Subscription, SubscriptionCategory, UpdateSubscriptionDto,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// 空白除去用の正規表現
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("正規表現が不正"));

/// カテゴリ同義語テーブル
///
/// 自由入力・レガシーのカテゴリラベルから正規カテゴリへの明示的な
/// 写像。キーは整形済み（小文字・空白なし）の文字列。
static CATEGORY_SYNONYMS: Lazy<HashMap<&'static str, SubscriptionCategory>> = Lazy::new(|| {
    use SubscriptionCategory::*;
    HashMap::from([
        ("streaming", Streaming),
        ("video", Streaming),
        ("netflix", Streaming),
        ("hbo", Streaming),
        ("twitch", Streaming),
        ("youtube", Streaming),
        ("primevideo", Streaming),
        ("disneyplus", Streaming),
        ("music", Music),
        ("spotify", Music),
        ("applemusic", Music),
        ("games", Games),
        ("game", Games),
        ("gaming", Games),
        ("steam", Games),
        ("education", Education),
        ("study", Education),
        ("course", Education),
        ("health", Health),
        ("fitness", Health),
        ("sport", Health),
        ("work", Work),
        ("productivity", Work),
        ("tools", Work),
        ("finance", Financial),
        ("financial", Financial),
        ("bank", Financial),
        ("shopping", Shopping),
        ("shop", Shopping),
        ("store", Shopping),
        ("other", Other),
        ("misc", Other),
        ("miscellaneous", Other),
    ])
});

/// 正規化時のデフォルト値テーブル
///
/// 欠落フィールドの埋め方を一箇所に集約する（散在させない）。
#[derive(Debug, Clone)]
pub struct NormalizeDefaults {
    pub price: f64,
    pub currency: Currency,
    pub cycle: BillingCycle,
    pub reminder_days: u8,
}

impl Default for NormalizeDefaults {
    fn default() -> Self {
        Self {
            price: 0.0,
            currency: Currency::Usd,
            cycle: BillingCycle::Monthly,
            reminder_days: 3,
        }
    }
}

/// 許容されるリマインダー日数
const ALLOWED_REMINDER_DAYS: [u8; 3] = [1, 3, 7];

/// 自由入力のカテゴリラベルを正規カテゴリへ写像する
///
/// 入力はトリム・小文字化・空白除去のうえで同義語テーブルを引く。
/// 整形後の値がすでに正規カテゴリ名の場合はそのまま採用する。
///
/// # 引数
/// * `raw` - 自由入力のカテゴリラベル
///
/// # 戻り値
/// 正規カテゴリ、または写像できない場合はNone
/// （「カテゴリなし」は有効な状態でありエラーではない）
pub fn normalize_category(raw: &str) -> Option<SubscriptionCategory> {
    let cleaned = WHITESPACE.replace_all(raw.trim(), "").to_lowercase();
    if cleaned.is_empty() {
        return None;
    }

    if let Some(category) = CATEGORY_SYNONYMS.get(cleaned.as_str()) {
        return Some(*category);
    }

    SubscriptionCategory::parse(&cleaned)
}

/// 日付文字列を解析する
///
/// RFC3339、タイムゾーンなしのISO形式、日付のみ（YYYY-MM-DD）の
/// 順で解析を試みる。いずれも失敗した場合はNoneを返し、不正な
/// 日付値を下流に伝播させない。
///
/// # 引数
/// * `raw` - 日付文字列
///
/// # 戻り値
/// UTCの日時、または解析不能な場合はNone
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    log::debug!("日付の解析に失敗しました（未定として扱います）: {trimmed}");
    None
}

/// 候補キーのうち最初に存在する非nullの値を返す
///
/// バックエンドによってフィールド名がcamelCaseとsnake_caseで揺れる
/// ため、両方の名前を許容する。
fn pick<'a>(doc: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| doc.get(*key))
        .find(|v| !v.is_null())
}

/// 値を文字列として取り出す（数値はそのまま文字列化する）
fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 値を日時として取り出す（文字列またはエポックミリ秒）
fn as_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// レコードからID文字列を取り出す
///
/// `id`、またはMongo系バックエンドの`_id`（文字列化済み、もしくは
/// `{"$oid": "..."}`形式）を許容する。
fn pick_id(doc: &Value) -> Option<String> {
    if let Some(value) = pick(doc, &["id"]) {
        if let Some(s) = as_string(value) {
            return Some(s);
        }
    }
    match doc.get("_id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(obj)) => obj.get("$oid").and_then(|v| v.as_str()).map(String::from),
        _ => None,
    }
}

/// 緩い型付けのレコードを正規の`Subscription`へ変換する
///
/// # 引数
/// * `doc` - リモートストアからの生レコード
///
/// # 戻り値
/// 正規化されたサブスクリプション
///
/// # 正規化規則
/// - camelCase / snake_case 両方のフィールド名を許容する
/// - 数値フィールドの欠落・非数値はデフォルト0、負の金額は0に丸める
/// - 通貨の欠落・未対応値はUSD、サイクルの欠落はmonthly
/// - リマインダー日数は{1,3,7}以外を3に正規化する
/// - 解析不能な請求日はNone（「未定」状態）とし、エラーにしない
/// - カテゴリフィールドが欠落している場合のみサービス名からの導出を試みる
///   （明示的だが未知のラベルはNoneのまま）
pub fn to_subscription(doc: &Value) -> Subscription {
    let defaults = NormalizeDefaults::default();

    let price = pick(doc, &["price"])
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|p| p.is_finite())
        .unwrap_or(defaults.price)
        .max(0.0);

    let currency = pick(doc, &["currency"])
        .and_then(|v| serde_json::from_value::<Currency>(v.clone()).ok())
        .unwrap_or(defaults.currency);

    let cycle = pick(doc, &["cycle"])
        .and_then(|v| serde_json::from_value::<BillingCycle>(v.clone()).ok())
        .unwrap_or(defaults.cycle);

    let reminder_days = pick(doc, &["reminderDays", "reminder_days"])
        .and_then(|v| v.as_u64())
        .and_then(|d| u8::try_from(d).ok())
        .filter(|d| ALLOWED_REMINDER_DAYS.contains(d))
        .unwrap_or(defaults.reminder_days);

    let name = pick(doc, &["name"])
        .and_then(as_string)
        .unwrap_or_default();

    // サービス名からの導出はカテゴリフィールドが欠落・nullのときだけ。
    // 明示的な値が未知のラベルでもNone（カテゴリなし）のまま残す。
    let category = match pick(doc, &["category"]) {
        Some(value) => value.as_str().and_then(normalize_category),
        None => normalize_category(&name),
    };

    Subscription {
        id: pick_id(doc),
        user_id: pick(doc, &["userId", "user_id"])
            .and_then(as_string)
            .unwrap_or_default(),
        name,
        price,
        currency,
        cycle,
        billing_date: pick(doc, &["billingDate", "billing_date"]).and_then(as_datetime),
        reminder_days,
        category,
        created_at: pick(doc, &["createdAt", "created_at"]).and_then(as_datetime),
        updated_at: pick(doc, &["updatedAt", "updated_at"]).and_then(as_datetime),
    }
}

/// 緩い型付けのレコードを正規の`Category`へ変換する
///
/// # 引数
/// * `doc` - リモートストアからの生レコード
///
/// # 戻り値
/// 正規化されたカテゴリー
pub fn to_category(doc: &Value) -> Category {
    Category {
        id: pick_id(doc),
        user_id: pick(doc, &["userId", "user_id"])
            .and_then(as_string)
            .unwrap_or_default(),
        name: pick(doc, &["name"])
            .and_then(as_string)
            .unwrap_or_default(),
        created_at: pick(doc, &["createdAt", "created_at"]).and_then(as_datetime),
        updated_at: pick(doc, &["updatedAt", "updated_at"]).and_then(as_datetime),
    }
}

/// 既存レコードへ更新フィールドを浅くマージし、再正規化する
///
/// サーバーの部分レスポンスでは置き換えず、最後に取得した完全な
/// レコードへ受理済みフィールドのみを重ねる。更新DTOに`user_id`は
/// 存在しないため、所有者の書き換えは起こらない。
///
/// # 引数
/// * `current` - ストアが保持する現在のレコード
/// * `update` - 受理された更新フィールド
///
/// # 戻り値
/// マージ後に再正規化されたサブスクリプション
pub fn apply_update(current: &Subscription, update: &UpdateSubscriptionDto) -> Subscription {
    let mut doc = serde_json::to_value(current).unwrap_or(Value::Null);

    if let Value::Object(ref mut map) = doc {
        if let Some(name) = &update.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(price) = update.price {
            if let Some(number) = serde_json::Number::from_f64(price) {
                map.insert("price".to_string(), Value::Number(number));
            }
        }
        if let Some(billing_date) = update.billing_date {
            map.insert(
                "billingDate".to_string(),
                Value::String(billing_date.to_rfc3339()),
            );
        }
    }

    to_subscription(&doc)
}
