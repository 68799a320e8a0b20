use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use serde::Deserialize;

use crate::collecting::constants::*;
use crate::models::catalog::{OfficeRef, ServiceRef};
use crate::models::dataset::DayEntry;

/// Date range sent to the day-availability endpoint, start and end inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window starting today and spanning the given number of weeks.
    pub fn from_today(weeks: i64) -> DateWindow {
        let start = Local::now().date_naive();
        DateWindow {
            start,
            end: start + ChronoDuration::weeks(weeks),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableDaysResponse {
    /// Dates with at least one free slot, `YYYY-MM-DD`. The backend omits
    /// the key entirely when nothing is available.
    #[serde(rename = "availableDays", default)]
    pub available_days: Vec<String>,
}

/// Failures worth another attempt: the connection never happened, timed out,
/// or the body was not decodable JSON. Everything else propagates as-is.
pub fn transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || err.is_decode()
}

/// Thin wrapper over the two availability endpoints. Only the numeric ids
/// from the catalog ever go on the wire.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<BackendClient> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building http client")?;
        Ok(BackendClient {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn available_days(
        &self,
        window: &DateWindow,
        office: &OfficeRef,
        service: &ServiceRef,
    ) -> Result<AvailableDaysResponse, reqwest::Error> {
        self.http
            .get(format!("{}{}", self.base_url, AVAILABLE_DAYS_PATH))
            .query(&[
                ("startDate", window.start.format(DATE_FORMAT).to_string()),
                ("endDate", window.end.format(DATE_FORMAT).to_string()),
                ("officeId", office.office_id.to_string()),
                ("serviceId", service.service_id.to_string()),
                ("serviceCount", SERVICE_COUNT.to_string()),
            ])
            .send()
            .await?
            .json()
            .await
    }

    pub async fn appointments_for_date(
        &self,
        date: NaiveDate,
        office: &OfficeRef,
        service: &ServiceRef,
    ) -> Result<DayEntry, reqwest::Error> {
        self.http
            .get(format!("{}{}", self.base_url, AVAILABLE_APPOINTMENTS_PATH))
            .query(&[
                ("date", date.format(DATE_FORMAT).to_string()),
                ("officeId", office.office_id.to_string()),
                ("serviceId", service.service_id.to_string()),
                ("serviceCount", SERVICE_COUNT.to_string()),
            ])
            .send()
            .await?
            .json()
            .await
    }
}
