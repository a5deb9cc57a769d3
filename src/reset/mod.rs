//! Once-per-UTC-day reset of airdrop completion status.
//!
//! The gate runs ahead of every request. When the UTC date differs from the
//! date of the last successful reset it issues one bulk update that marks
//! every airdrop `NOT_FINISHED`. Failures are logged and swallowed so the
//! next request retries. Concurrent requests at rollover may each issue the
//! update; the write is idempotent.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use tracing::{info, warn};

use crate::entities::airdrop::{self, AirdropStatus};

/// Day marker meaning no reset has succeeded since process start.
const NEVER: i32 = 0;

pub trait Clock: Send + Sync {
    /// Current calendar date in UTC.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Bulk status write issued by the gate.
pub trait StatusReset: Sync {
    fn reset_all_statuses(&self) -> impl Future<Output = Result<u64, DbErr>> + Send;
}

impl StatusReset for DatabaseConnection {
    async fn reset_all_statuses(&self) -> Result<u64, DbErr> {
        let result = airdrop::Entity::update_many()
            .col_expr(
                airdrop::Column::Status,
                Expr::value(AirdropStatus::NotFinished.as_str()),
            )
            .exec(self)
            .await?;
        Ok(result.rows_affected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// A reset already succeeded today.
    Current,
    Reset { rows: u64 },
    Failed,
}

pub struct ResetGate {
    clock: Arc<dyn Clock>,
    last_reset_day: AtomicI32,
}

impl ResetGate {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_reset_day: AtomicI32::new(NEVER),
        }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn last_reset_date(&self) -> Option<NaiveDate> {
        match self.last_reset_day.load(Ordering::Acquire) {
            NEVER => None,
            day => NaiveDate::from_num_days_from_ce_opt(day),
        }
    }

    pub async fn maybe_reset<S>(&self, store: &S) -> ResetOutcome
    where
        S: StatusReset,
    {
        let today = self.clock.today();
        let today_marker = today.num_days_from_ce();
        assert!(today_marker != NEVER, "Calendar day marker collides with unset");

        if self.last_reset_day.load(Ordering::Acquire) == today_marker {
            return ResetOutcome::Current;
        }

        match store.reset_all_statuses().await {
            Ok(rows) => {
                self.last_reset_day.store(today_marker, Ordering::Release);
                info!("Daily airdrop status reset for {today}: {rows} rows");
                ResetOutcome::Reset { rows }
            }
            Err(err) => {
                warn!("Daily airdrop status reset failed, retrying on next request: {err}");
                ResetOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Clock pinned to a date that tests move forward explicitly.
    pub struct ManualClock {
        day: AtomicI32,
    }

    impl ManualClock {
        pub fn new(date: NaiveDate) -> Self {
            Self {
                day: AtomicI32::new(date.num_days_from_ce()),
            }
        }

        pub fn advance_days(&self, days: i32) {
            self.day.fetch_add(days, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn today(&self) -> NaiveDate {
            NaiveDate::from_num_days_from_ce_opt(self.day.load(Ordering::SeqCst))
                .expect("manual clock within calendar range")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::test_support::ManualClock;
    use super::*;
    use crate::store::airdrops::{self, NewAirdrop};
    use crate::store::test_support::memory_database;

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    impl StatusReset for CountingStore {
        async fn reset_all_statuses(&self) -> Result<u64, DbErr> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(3)
        }
    }

    #[derive(Default)]
    struct UnavailableStore {
        calls: AtomicUsize,
    }

    impl StatusReset for UnavailableStore {
        async fn reset_all_statuses(&self) -> Result<u64, DbErr> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DbErr::Custom("connection refused".to_string()))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn first_request_resets_then_gate_is_current() {
        let clock = Arc::new(ManualClock::new(date(2026, 10, 18)));
        let gate = ResetGate::new(clock);
        let store = CountingStore::default();

        assert_eq!(gate.last_reset_date(), None);
        assert_eq!(gate.maybe_reset(&store).await, ResetOutcome::Reset { rows: 3 });
        assert_eq!(gate.maybe_reset(&store).await, ResetOutcome::Current);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.last_reset_date(), Some(date(2026, 10, 18)));
    }

    #[tokio::test]
    async fn rollover_issues_exactly_one_update() {
        let clock = Arc::new(ManualClock::new(date(2026, 12, 31)));
        let gate = ResetGate::new(clock.clone());
        let store = CountingStore::default();

        gate.maybe_reset(&store).await;
        clock.advance_days(1);

        assert_eq!(gate.maybe_reset(&store).await, ResetOutcome::Reset { rows: 3 });
        assert_eq!(gate.last_reset_date(), Some(date(2027, 1, 1)));
        assert_eq!(gate.maybe_reset(&store).await, ResetOutcome::Current);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_is_swallowed_and_retried() {
        let clock = Arc::new(ManualClock::new(date(2026, 10, 18)));
        let gate = ResetGate::new(clock);
        let store = UnavailableStore::default();

        assert_eq!(gate.maybe_reset(&store).await, ResetOutcome::Failed);
        assert_eq!(gate.last_reset_date(), None);
        assert_eq!(gate.maybe_reset(&store).await, ResetOutcome::Failed);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);

        let recovered = CountingStore::default();
        assert_eq!(
            gate.maybe_reset(&recovered).await,
            ResetOutcome::Reset { rows: 3 }
        );
        assert_eq!(gate.last_reset_date(), Some(date(2026, 10, 18)));
    }

    #[tokio::test]
    async fn bulk_reset_is_idempotent() {
        let db = memory_database().await;
        for name in ["a", "b"] {
            let (created, _) = airdrops::create_airdrop(
                &db,
                NewAirdrop {
                    name: name.to_string(),
                    x_handle: "@h".to_string(),
                    website_url: "https://h.io".to_string(),
                    info: "info".to_string(),
                    logo_url: None,
                    tasks: Vec::new(),
                },
            )
            .await
            .unwrap();
            airdrops::set_airdrop_status(&db, created.id, AirdropStatus::Finished)
                .await
                .unwrap();
        }

        assert_eq!(db.reset_all_statuses().await.unwrap(), 2);
        let once = airdrop::Entity::find().all(&db).await.unwrap();
        assert_eq!(db.reset_all_statuses().await.unwrap(), 2);
        let twice = airdrop::Entity::find().all(&db).await.unwrap();

        assert_eq!(once, twice);
        assert!(twice.iter().all(|model| model.status == AirdropStatus::NotFinished));
    }
}
