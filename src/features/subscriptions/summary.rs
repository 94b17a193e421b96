/// 集計モジュール（Aggregator）
///
/// ストアが保持するサブスクリプション集合の純粋な導出レイヤー。
/// 副作用を持たず、読み取りのたびに再計算されます。通貨換算は
/// 行わず、`currency`フィールドに関係なく素朴に合算します
/// （意図した挙動であり、黙って「修正」しないこと）。
use crate::features::subscriptions::models::{BillingCycle, Subscription};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 「まもなく請求」と見なすウィンドウ（現在時刻から7日間、両端含む）
const UPCOMING_WINDOW_DAYS: i64 = 7;

/// 小数第2位への丸め
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 月額サブスクリプションの合計金額
///
/// # 引数
/// * `subscriptions` - サブスクリプション集合のスナップショット
///
/// # 戻り値
/// cycle=monthlyの金額合計（小数第2位丸め、通貨は区別しない）
pub fn monthly_total(subscriptions: &[Subscription]) -> f64 {
    round2(
        subscriptions
            .iter()
            .filter(|sub| sub.cycle == BillingCycle::Monthly)
            .map(|sub| sub.price)
            .sum(),
    )
}

/// 年額サブスクリプションの合計金額
///
/// # 引数
/// * `subscriptions` - サブスクリプション集合のスナップショット
///
/// # 戻り値
/// cycle=yearlyの金額合計（小数第2位丸め、通貨は区別しない）
pub fn yearly_total(subscriptions: &[Subscription]) -> f64 {
    round2(
        subscriptions
            .iter()
            .filter(|sub| sub.cycle == BillingCycle::Yearly)
            .map(|sub| sub.price)
            .sum(),
    )
}

/// まもなく請求されるサブスクリプションの一覧
///
/// 請求日が`[now, now + 7日]`（両端含む）に入るものを請求日昇順で
/// 返す。請求日が未定（None）のものは除外され、「期限切れ」や
/// 「即時請求」として扱われることはない。
///
/// # 引数
/// * `subscriptions` - サブスクリプション集合のスナップショット
/// * `now` - 現在時刻
///
/// # 戻り値
/// ウィンドウ内のサブスクリプション（請求日昇順）
pub fn upcoming_payments(subscriptions: &[Subscription], now: DateTime<Utc>) -> Vec<Subscription> {
    let window_end = now + Duration::days(UPCOMING_WINDOW_DAYS);

    let mut upcoming: Vec<Subscription> = subscriptions
        .iter()
        .filter(|sub| match sub.billing_date {
            Some(date) => date >= now && date <= window_end,
            None => false,
        })
        .cloned()
        .collect();

    upcoming.sort_by_key(|sub| sub.billing_date);
    upcoming
}

/// まもなく請求される1件分のエントリ（残り日数付き）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingPayment {
    pub subscription: Subscription,
    pub days_until: i64,
}

/// サブスクリプション集合の財務サマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub monthly_total: f64,
    pub yearly_total: f64,
    pub upcoming_payments: Vec<UpcomingPayment>,
}

/// 財務サマリーを導出する
///
/// # 引数
/// * `subscriptions` - サブスクリプション集合のスナップショット
/// * `now` - 現在時刻
///
/// # 戻り値
/// 月額・年額合計と、残り日数付きの「まもなく請求」一覧
pub fn summarize(subscriptions: &[Subscription], now: DateTime<Utc>) -> SubscriptionSummary {
    let upcoming = upcoming_payments(subscriptions, now)
        .into_iter()
        .map(|subscription| {
            let days_until = subscription
                .billing_date
                .map(|date| (date - now).num_days())
                .unwrap_or(0);
            UpcomingPayment {
                subscription,
                days_until,
            }
        })
        .collect();

    SubscriptionSummary {
        monthly_total: monthly_total(subscriptions),
        yearly_total: yearly_total(subscriptions),
        upcoming_payments: upcoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::models::{Currency, SubscriptionCategory};
    use chrono::TimeZone;

    fn sub(
        name: &str,
        price: f64,
        cycle: BillingCycle,
        billing_date: Option<DateTime<Utc>>,
    ) -> Subscription {
        Subscription {
            id: Some(name.to_string()),
            user_id: "user-1".to_string(),
            name: name.to_string(),
            price,
            currency: Currency::Usd,
            cycle,
            billing_date,
            reminder_days: 3,
            category: Some(SubscriptionCategory::Other),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_totals_by_cycle() {
        let subs = vec![
            sub("a", 10.0, BillingCycle::Monthly, None),
            sub("b", 5.99, BillingCycle::Monthly, None),
            sub("c", 99.0, BillingCycle::Yearly, None),
        ];

        assert_eq!(monthly_total(&subs), 15.99);
        assert_eq!(yearly_total(&subs), 99.0);
    }

    #[test]
    fn test_totals_are_currency_blind() {
        // 通貨換算はしない（既知の低忠実度挙動の保存）
        let mut eur = sub("a", 10.0, BillingCycle::Monthly, None);
        eur.currency = Currency::Eur;
        let mut jpy = sub("b", 500.0, BillingCycle::Monthly, None);
        jpy.currency = Currency::Jpy;

        assert_eq!(monthly_total(&[eur, jpy]), 510.0);
    }

    #[test]
    fn test_totals_rounded_to_two_decimals() {
        // 浮動小数点の誤差が丸めで吸収されること
        let subs = vec![
            sub("a", 0.1, BillingCycle::Monthly, None),
            sub("b", 0.2, BillingCycle::Monthly, None),
        ];
        assert_eq!(monthly_total(&subs), 0.3);
    }

    #[test]
    fn test_empty_collection_totals() {
        assert_eq!(monthly_total(&[]), 0.0);
        assert_eq!(yearly_total(&[]), 0.0);
    }

    #[test]
    fn test_upcoming_window_boundaries() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        let at_now = sub("at_now", 1.0, BillingCycle::Monthly, Some(now));
        let at_end = sub(
            "at_end",
            1.0,
            BillingCycle::Monthly,
            Some(now + Duration::days(7)),
        );
        let past_end = sub(
            "past_end",
            1.0,
            BillingCycle::Monthly,
            Some(now + Duration::days(7) + Duration::seconds(1)),
        );
        let before_now = sub(
            "before_now",
            1.0,
            BillingCycle::Monthly,
            Some(now - Duration::seconds(1)),
        );

        let upcoming = upcoming_payments(&[at_now, at_end, past_end, before_now], now);
        let ids: Vec<&str> = upcoming.iter().filter_map(|s| s.id.as_deref()).collect();

        // 両端は含まれ、ウィンドウ外（1秒でも）は除外されること
        assert_eq!(ids, vec!["at_now", "at_end"]);
    }

    #[test]
    fn test_upcoming_excludes_unscheduled() {
        // 請求日未定（None）は「期限切れ」扱いにならず除外されること
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let unscheduled = sub("unscheduled", 1.0, BillingCycle::Monthly, None);

        assert!(upcoming_payments(&[unscheduled], now).is_empty());
    }

    #[test]
    fn test_upcoming_sorted_ascending() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let later = sub(
            "later",
            1.0,
            BillingCycle::Monthly,
            Some(now + Duration::days(5)),
        );
        let sooner = sub(
            "sooner",
            1.0,
            BillingCycle::Monthly,
            Some(now + Duration::days(2)),
        );

        let upcoming = upcoming_payments(&[later, sooner], now);
        let ids: Vec<&str> = upcoming.iter().filter_map(|s| s.id.as_deref()).collect();
        assert_eq!(ids, vec!["sooner", "later"]);
    }

    #[test]
    fn test_summarize_days_until() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let in_three_days = sub(
            "netflix",
            15.99,
            BillingCycle::Monthly,
            Some(now + Duration::days(3)),
        );

        let summary = summarize(&[in_three_days], now);
        assert_eq!(summary.monthly_total, 15.99);
        assert_eq!(summary.yearly_total, 0.0);
        assert_eq!(summary.upcoming_payments.len(), 1);
        assert_eq!(summary.upcoming_payments[0].days_until, 3);
    }
}
