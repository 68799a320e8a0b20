use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event, EventLike, Property};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::collecting::constants::BOOKING_URL;
use crate::models::catalog::{Catalog, OfficeRef, ServiceRef};
use crate::models::dataset::{DayEntry, OfficeMap};

/// Local wall-clock rendering for DTSTART/DTEND, combined with a TZID
/// parameter so clients resolve DST themselves.
const DT_LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Human-readable stamps in descriptions, with explicit UTC offset.
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Event UID, stable across reruns on unchanged data so calendar clients
/// treat a re-import as an update rather than a duplicate.
fn event_uid(timestamp: i64, office_name: &str) -> String {
    format!(
        "{timestamp}-{}@example.com",
        WHITESPACE.replace_all(office_name, "_")
    )
}

/// Expands one service's slice of the dataset into a calendar object.
///
/// The generation instant is injected rather than read from the clock, so a
/// synthesis pass is fully deterministic for a given dataset and instant.
pub struct Synthesizer {
    timezone: Tz,
    slot_minutes: i64,
    generated_at: DateTime<Utc>,
}

impl Synthesizer {
    pub fn new(timezone: Tz, slot_minutes: i64, generated_at: DateTime<Utc>) -> Synthesizer {
        Synthesizer {
            timezone,
            slot_minutes,
            generated_at,
        }
    }

    /// Builds the calendar for one service: one event per timestamp of every
    /// non-error day across all its offices, offices and days in sorted
    /// order. Error-code entries contribute nothing and are not failures.
    pub fn synthesize(
        &self,
        service: &ServiceRef,
        offices: &OfficeMap,
        catalog: &Catalog,
    ) -> Result<Calendar> {
        // Calendar::new() prefills VERSION/PRODID/CALSCALE; starting empty
        // keeps PRODID single-valued as RFC 5545 requires.
        let mut calendar = Calendar::empty();
        calendar.append_property(Property::new("VERSION", "2.0"));
        calendar.append_property(Property::new(
            "PRODID",
            &format!("-//Appointments Buergerbuero Muenchen//{}//", service.name),
        ));
        calendar.append_property(Property::new("CALSCALE", "GREGORIAN"));
        calendar.append_property(Property::new("METHOD", "PUBLISH"));

        for (office_name, dates) in offices {
            let office = catalog
                .office(office_name)
                .with_context(|| format!("unknown office '{office_name}' in dataset"))?;
            for entry in dates.values() {
                if entry.is_error() {
                    continue;
                }
                let mut starts = entry.timestamps().to_vec();
                starts.sort_unstable();
                for ts in starts {
                    calendar.push(self.build_event(service, office, entry, ts)?);
                }
            }
        }

        Ok(calendar)
    }

    fn build_event(
        &self,
        service: &ServiceRef,
        office: &OfficeRef,
        entry: &DayEntry,
        timestamp: i64,
    ) -> Result<Event> {
        let start = DateTime::from_timestamp(timestamp, 0)
            .with_context(|| format!("timestamp {timestamp} out of range"))?
            .with_timezone(&self.timezone);
        let end = start + Duration::minutes(self.slot_minutes);
        let tzid = self.timezone.name();

        let retrieved_at = self
            .generated_at
            .with_timezone(&self.timezone)
            .format(STAMP_FORMAT);
        let last_modified = entry
            .last_modified
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.with_timezone(&self.timezone).format(STAMP_FORMAT).to_string())
            .unwrap_or_else(|| "not available".to_string());
        let description = format!(
            "Booking: {BOOKING_URL}?serviceId={}\nRetrieved at: {retrieved_at}\nLast modified: {last_modified}",
            service.service_id
        );

        let mut event = Event::new();
        event
            .summary(&format!("{} - {}", service.name, office.name))
            .location(office.address)
            .description(&description)
            .uid(&event_uid(timestamp, office.name))
            .timestamp(self.generated_at)
            .append_property(
                Property::new("DTSTART", &start.format(DT_LOCAL_FORMAT).to_string())
                    .add_parameter("TZID", tzid)
                    .done(),
            )
            .append_property(
                Property::new("DTEND", &end.format(DT_LOCAL_FORMAT).to_string())
                    .add_parameter("TZID", tzid)
                    .done(),
            );
        Ok(event.done())
    }
}
