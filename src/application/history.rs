use crate::domain::ports::TransactionHistoryRef;
use crate::domain::session::SessionContext;
use crate::domain::transaction::{TransactionRecord, TransactionStatus};
use crate::error::{PaymentError, Result};
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::str::FromStr;
use tracing::{debug, info};

const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Success,
    Failed,
}

impl StatusFilter {
    pub fn matches(&self, status: TransactionStatus) -> bool {
        match self {
            Self::All => true,
            Self::Success => status == TransactionStatus::Success,
            Self::Failed => status == TransactionStatus::Failed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(PaymentError::validation(format!(
                "Unknown status filter: {other}"
            ))),
        }
    }
}

/// Read-only views over the user's transaction history.
pub struct HistoryService {
    session: SessionContext,
    history: TransactionHistoryRef,
}

impl HistoryService {
    pub fn new(session: SessionContext, history: TransactionHistoryRef) -> Self {
        Self { session, history }
    }

    /// The ten most recent transactions, newest first, narrowed by `filter`.
    ///
    /// The backend returns history oldest first.
    pub async fn recent(&self, filter: StatusFilter) -> Result<Vec<TransactionRecord>> {
        let records = self.history.transactions(&self.session.user_id).await?;
        if records.is_empty() {
            info!("no transactions found");
        }
        Ok(last_ten(records)
            .into_iter()
            .filter(|record| filter.matches(record.status))
            .collect())
    }

    /// Transactions between `from` and `to` inclusive, newest first.
    pub async fn between(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<TransactionRecord>> {
        let (Some(from), Some(to)) = (from, to) else {
            return Err(PaymentError::validation(
                "Please select both From and To dates.",
            ));
        };
        if from > to {
            return Err(PaymentError::validation(
                "From date must not be after To date.",
            ));
        }

        let mut records = self
            .history
            .transactions_between(&self.session.user_id, from, to)
            .await?;
        debug!(count = records.len(), %from, %to, "transactions in range");
        sort_newest_first(&mut records);
        Ok(records)
    }
}

fn last_ten(records: Vec<TransactionRecord>) -> Vec<TransactionRecord> {
    let skip = records.len().saturating_sub(RECENT_LIMIT);
    records.into_iter().skip(skip).rev().collect()
}

/// Records with an unparseable date sort after all dated ones.
fn sort_newest_first(records: &mut [TransactionRecord]) {
    records.sort_by_key(|record| (record.timestamp().is_none(), Reverse(record.timestamp())));
}
