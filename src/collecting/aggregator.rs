use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::collecting::client::{BackendClient, DateWindow, transient};
use crate::collecting::constants::DATE_FORMAT;
use crate::collecting::retry::RetryPolicy;
use crate::models::catalog::{Catalog, OfficeRef, ServiceRef};
use crate::models::dataset::{DateMap, Dataset, DatasetBuilder};

/// What to do when one (service, office) pair keeps failing after all
/// retries. `Abort` kills the whole run and persists nothing; `SkipPair`
/// logs the pair and leaves it out of the dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    #[default]
    Abort,
    SkipPair,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<FailurePolicy> {
        match s {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::SkipPair),
            other => bail!("unknown failure policy '{other}', expected abort or skip"),
        }
    }
}

/// Collects the availability of one (service, office) pair, both endpoint
/// calls guarded by the retry policy.
pub struct Collector<'a> {
    client: &'a BackendClient,
    retry: RetryPolicy,
}

impl<'a> Collector<'a> {
    pub fn new(client: &'a BackendClient, retry: RetryPolicy) -> Collector<'a> {
        Collector { client, retry }
    }

    /// Queries the day-availability endpoint once, then the slot endpoint
    /// exactly once per reported day. Slot payloads are stored verbatim,
    /// error-code entries included.
    pub async fn collect_pair(
        &self,
        window: &DateWindow,
        office: &OfficeRef,
        service: &ServiceRef,
    ) -> Result<DateMap> {
        let days = self
            .retry
            .run(transient, || {
                self.client.available_days(window, office, service)
            })
            .await
            .with_context(|| {
                format!("fetching available days for {} at {}", service.name, office.name)
            })?;

        let mut dates = DateMap::new();
        for day in days.available_days {
            debug!("fetching slots for {} at {} on {day}", service.name, office.name);
            let date = NaiveDate::parse_from_str(&day, DATE_FORMAT)
                .with_context(|| format!("backend returned unparseable day '{day}'"))?;
            let entry = self
                .retry
                .run(transient, || {
                    self.client.appointments_for_date(date, office, service)
                })
                .await
                .with_context(|| {
                    format!("fetching slots for {} at {} on {day}", service.name, office.name)
                })?;
            dates.insert(day, entry);
        }
        Ok(dates)
    }
}

/// Walks the full service × office cross product from the catalog and
/// assembles the dataset. Excluded pairs are skipped without touching the
/// network. The finished dataset is only handed out once every pair has been
/// processed; persisting it is the caller's job.
pub async fn collect_all(
    client: &BackendClient,
    catalog: &Catalog,
    window: &DateWindow,
    retry: RetryPolicy,
    policy: FailurePolicy,
) -> Result<Dataset> {
    let collector = Collector::new(client, retry);
    let mut builder = DatasetBuilder::new();

    for service in catalog.services() {
        info!("collecting service {}", service.name);
        for office in catalog.offices() {
            if !catalog.is_offered(service, office) {
                debug!("skipping {} at {}, not offered", service.name, office.name);
                continue;
            }
            info!("collecting office {}", office.name);
            match collector.collect_pair(window, office, service).await {
                Ok(dates) => builder.insert_pair(service.name, office.name, dates),
                Err(err) => match policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::SkipPair => {
                        error!("skipping {} at {}: {err:#}", service.name, office.name);
                    }
                },
            }
        }
    }

    Ok(builder.finalize())
}
