//! Administrator dashboard: parallel list fetch and aggregates.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::api::ApiClient;
use crate::error::{PaydeskError, PaydeskResult};
use crate::types::{BankCard, PaymentEntity, TransactionEntity};

/// Entries shown in each "recent" panel.
pub const RECENT_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Transactions,
    Payments,
    Cards,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transactions => "transactions",
            Self::Payments => "payments",
            Self::Cards => "cards",
        })
    }
}

/// Raw lists behind the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardData {
    pub transactions: Vec<TransactionEntity>,
    pub payments: Vec<PaymentEntity>,
    pub cards: Vec<BankCard>,

    /// Lists that could not be fetched and were replaced by empty ones.
    pub failed_sources: Vec<DataSource>,

    /// Every source refused the session credential.
    #[serde(skip)]
    pub credential_rejected: bool,
}

/// Fetch the three lists concurrently.
///
/// Each fetch fails independently: a failure yields an empty list and is
/// recorded in [`DashboardData::failed_sources`]. When all three fail because
/// the credential was refused, [`DashboardData::credential_rejected`] is set.
pub async fn fetch_dashboard(client: &ApiClient) -> DashboardData {
    let (transactions, payments, cards) = tokio::join!(
        client.list_transactions(),
        client.list_payments(),
        client.list_cards(),
    );

    let credential_rejected = [
        transactions.as_ref().err(),
        payments.as_ref().err(),
        cards.as_ref().err(),
    ]
    .into_iter()
    .all(|failure| failure.is_some_and(PaydeskError::invalidates_session));

    let mut failed_sources = Vec::new();
    let transactions = or_empty(DataSource::Transactions, transactions, &mut failed_sources);
    let payments = or_empty(DataSource::Payments, payments, &mut failed_sources);
    let cards = or_empty(DataSource::Cards, cards, &mut failed_sources);

    DashboardData {
        transactions,
        payments,
        cards,
        failed_sources,
        credential_rejected,
    }
}

fn or_empty<T>(
    source: DataSource,
    result: PaydeskResult<Vec<T>>,
    failed: &mut Vec<DataSource>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(source = %source, error = %e, "dashboard source unavailable");
            failed.push(source);
            Vec::new()
        }
    }
}

/// Transactions recorded on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// `YYYY-MM-DD`.
    pub day: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub transaction_count: usize,
    pub payment_count: usize,
    pub card_count: usize,
    pub recent_transactions: Vec<TransactionEntity>,
    pub recent_payments: Vec<PaymentEntity>,
    pub recent_cards: Vec<BankCard>,

    /// Ascending by day.
    pub daily_volume: Vec<DailyCount>,

    /// Busiest day's share of all transactions, in percent.
    pub peak_rate_percent: Option<u32>,
}

impl DashboardData {
    pub fn summary(&self) -> DashboardSummary {
        let daily_volume = group_by_day(self.transactions.iter().map(TransactionEntity::timestamp));

        let peak_rate_percent = daily_volume.iter().map(|d| d.count).max().map(|peak| {
            let total = self.transactions.len().max(1);
            ((peak as f64 / total as f64) * 100.0).round() as u32
        });

        DashboardSummary {
            transaction_count: self.transactions.len(),
            payment_count: self.payments.len(),
            card_count: self.cards.len(),
            recent_transactions: most_recent(&self.transactions, TransactionEntity::timestamp),
            recent_payments: most_recent(&self.payments, PaymentEntity::timestamp),
            recent_cards: most_recent(&self.cards, BankCard::timestamp),
            daily_volume,
            peak_rate_percent,
        }
    }
}

/// Newest [`RECENT_LIMIT`] items by timestamp string.
fn most_recent<T: Clone>(items: &[T], timestamp: impl Fn(&T) -> &str) -> Vec<T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| timestamp(*b).cmp(timestamp(*a)));
    sorted.into_iter().take(RECENT_LIMIT).cloned().collect()
}

/// Count timestamps per day (first ten characters), skipping empty ones.
pub fn group_by_day<'a>(timestamps: impl IntoIterator<Item = &'a str>) -> Vec<DailyCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for ts in timestamps {
        let day = ts.get(..10).unwrap_or(ts);
        if !day.is_empty() {
            *counts.entry(day).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(day, count)| DailyCount {
            day: day.to_string(),
            count,
        })
        .collect()
}

/// Human status of a transaction or payment as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTitle {
    Approved,
    Declined,
    Unknown,
    Other(String),
}

impl fmt::Display for StatusTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Unknown => "unknown",
            Self::Other(raw) => raw.as_str(),
        })
    }
}

pub fn status_title(status: Option<&str>) -> StatusTitle {
    let Some(raw) = status.filter(|s| !s.is_empty()) else {
        return StatusTitle::Unknown;
    };
    let lower = raw.to_lowercase();
    if lower.contains("valid") || lower.contains("success") {
        StatusTitle::Approved
    } else if lower.contains("refus") || lower.contains("fail") {
        StatusTitle::Declined
    } else {
        StatusTitle::Other(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, created_at: &str) -> TransactionEntity {
        TransactionEntity {
            id: Some(id.into()),
            created_at: Some(created_at.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_group_by_day() {
        let days = group_by_day([
            "2025-12-02T10:00:00",
            "2025-12-01 09:00",
            "",
            "2025-12-02 18:30",
            "2025-12",
        ]);
        assert_eq!(
            days,
            vec![
                DailyCount { day: "2025-12".into(), count: 1 },
                DailyCount { day: "2025-12-01".into(), count: 1 },
                DailyCount { day: "2025-12-02".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_summary_recent_and_peak() {
        let data = DashboardData {
            transactions: vec![
                tx("1", "2025-12-01 08:00"),
                tx("2", "2025-12-03 08:00"),
                tx("3", "2025-12-02 08:00"),
                tx("4", "2025-12-03 09:00"),
                tx("5", "2025-11-30 09:00"),
            ],
            cards: vec![
                BankCard {
                    card_number: "4111111111111111".into(),
                    expiration: "2027-01".into(),
                    ..Default::default()
                },
                BankCard {
                    card_number: "5500000000000004".into(),
                    expiration: "2029-05".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let summary = data.summary();
        assert_eq!(summary.transaction_count, 5);
        assert_eq!(summary.payment_count, 0);
        let recent: Vec<_> = summary
            .recent_transactions
            .iter()
            .map(|t| t.id.as_deref().unwrap())
            .collect();
        assert_eq!(recent, vec!["4", "2", "3", "1"]);
        assert_eq!(summary.recent_cards[0].card_number, "5500000000000004");
        assert_eq!(summary.daily_volume.len(), 4);
        // Busiest day has 2 of 5 transactions.
        assert_eq!(summary.peak_rate_percent, Some(40));
    }

    #[test]
    fn test_empty_summary_has_no_rate() {
        let summary = DashboardData::default().summary();
        assert_eq!(summary.transaction_count, 0);
        assert!(summary.daily_volume.is_empty());
        assert_eq!(summary.peak_rate_percent, None);
    }

    #[test]
    fn test_status_title() {
        assert_eq!(status_title(Some("Validée")), StatusTitle::Approved);
        assert_eq!(status_title(Some("SUCCESS")), StatusTitle::Approved);
        assert_eq!(status_title(Some("FAILED")), StatusTitle::Declined);
        assert_eq!(status_title(Some("Refusée")), StatusTitle::Declined);
        assert_eq!(status_title(None), StatusTitle::Unknown);
        assert_eq!(status_title(Some("")), StatusTitle::Unknown);
        assert_eq!(
            status_title(Some("PENDING")),
            StatusTitle::Other("PENDING".into())
        );
    }
}
