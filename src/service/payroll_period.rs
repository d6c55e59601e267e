use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::error::{HrError, Result};
use crate::model::payroll_period::{NewPayrollPeriod, PayrollPeriod};
use crate::store::{PERIOD_DATE_ORDER, PERIOD_NO_OVERLAP, PayrollPeriodStore, StoreError, bounded};

/// Keeps payroll periods ordered and pairwise disjoint.
///
/// The overlap query only produces a precise rejection early. Two inserts
/// racing on intersecting ranges can both pass it; the exclusion constraint
/// on the table decides which one lands.
#[derive(Clone)]
pub struct PayrollPeriodRegistry {
    store: Arc<dyn PayrollPeriodStore>,
    timeout: Duration,
}

impl PayrollPeriodRegistry {
    pub fn new(store: Arc<dyn PayrollPeriodStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn insert(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        actor: Option<i64>,
    ) -> Result<PayrollPeriod> {
        if start_date > end_date {
            info!(%start_date, %end_date, "Payroll period with inverted dates rejected");
            return Err(HrError::InvalidDateOrder);
        }

        let overlap = bounded(self.timeout, self.store.any_overlapping(start_date, end_date))
            .await
            .map_err(|e| self.failure(e, start_date, end_date))?;
        if overlap {
            info!(%start_date, %end_date, "Overlapping payroll period rejected");
            return Err(HrError::PeriodOverlap);
        }

        let new = NewPayrollPeriod {
            start_date,
            end_date,
            actor,
        };

        match bounded(self.timeout, self.store.insert(new)).await {
            Ok(period) => {
                info!(id = period.id, %start_date, %end_date, "Payroll period created");
                Ok(period)
            }
            Err(e) if e.violates(PERIOD_NO_OVERLAP) => {
                info!(%start_date, %end_date, "Payroll period lost overlap race");
                Err(HrError::PeriodOverlap)
            }
            Err(e) if e.violates(PERIOD_DATE_ORDER) => Err(HrError::InvalidDateOrder),
            Err(e) => Err(self.failure(e, start_date, end_date)),
        }
    }

    /// One page of periods, newest first, with the total count.
    pub async fn list(&self, page: u32, per_page: u32) -> Result<(Vec<PayrollPeriod>, i64)> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);

        let total = bounded(self.timeout, self.store.count()).await.map_err(|e| {
            error!(error = %e, "Failed to count payroll periods");
            HrError::from(e)
        })?;

        let data = bounded(self.timeout, self.store.list(i64::from(per_page), offset))
            .await
            .map_err(|e| {
                error!(error = %e, page, per_page, "Failed to fetch payroll periods");
                HrError::from(e)
            })?;

        Ok((data, total))
    }

    fn failure(&self, err: StoreError, start_date: NaiveDate, end_date: NaiveDate) -> HrError {
        error!(error = %err, %start_date, %end_date, "Payroll period store call failed");
        err.into()
    }
}
