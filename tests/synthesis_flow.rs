use std::collections::BTreeMap;

use buergerbuero_backend::calendar::synthesizer::Synthesizer;
use buergerbuero_backend::models::catalog::Catalog;
use buergerbuero_backend::models::dataset::{DayEntry, OfficeMap};
use chrono::{DateTime, TimeZone, Utc};

fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap()
}

fn berlin_synthesizer(generated_at: DateTime<Utc>) -> Synthesizer {
    Synthesizer::new(chrono_tz::Europe::Berlin, 15, generated_at)
}

fn slots(timestamps: Vec<i64>) -> DayEntry {
    DayEntry {
        appointment_timestamps: Some(timestamps),
        ..Default::default()
    }
}

fn single_office_slice(office: &str, date: &str, entry: DayEntry) -> OfficeMap {
    let mut dates = BTreeMap::new();
    dates.insert(date.to_string(), entry);
    let mut offices = OfficeMap::new();
    offices.insert(office.to_string(), dates);
    offices
}

/// Reverses RFC 5545 line folding so assertions can look at logical lines.
fn unfold(rendered: &str) -> String {
    rendered.replace("\r\n ", "")
}

fn uid_lines(rendered: &str) -> Vec<String> {
    rendered
        .lines()
        .map(|line| line.trim_end())
        .filter(|line| line.starts_with("UID:"))
        .map(|line| line.to_string())
        .collect()
}

#[test]
fn reisepass_at_orleansplatz_produces_two_local_events() {
    // 1714546800 = 2024-05-01 07:00 UTC = 09:00 in Berlin (CEST), the second
    // slot starts 15 minutes later.
    let catalog = Catalog::standard();
    let service = catalog.service("REISEPASS").unwrap();
    let offices = single_office_slice(
        "ORLEANSPLATZ",
        "2024-05-01",
        slots(vec![1714546800, 1714547700]),
    );

    let calendar = berlin_synthesizer(fixed_instant())
        .synthesize(service, &offices, catalog)
        .unwrap();
    let rendered = unfold(&calendar.to_string());

    assert_eq!(rendered.matches("BEGIN:VEVENT").count(), 2);
    assert!(rendered.contains("DTSTART;TZID=Europe/Berlin:20240501T090000"));
    assert!(rendered.contains("DTEND;TZID=Europe/Berlin:20240501T091500"));
    assert!(rendered.contains("DTSTART;TZID=Europe/Berlin:20240501T091500"));
    assert!(rendered.contains("DTEND;TZID=Europe/Berlin:20240501T093000"));
    assert!(rendered.contains("ORLEANSPLATZ 11"));

    let uids = uid_lines(&rendered);
    assert_eq!(uids.len(), 2);
    assert!(uids.contains(&"UID:1714546800-ORLEANSPLATZ@example.com".to_string()));
    assert!(uids.contains(&"UID:1714547700-ORLEANSPLATZ@example.com".to_string()));
}

#[test]
fn slot_duration_is_exactly_fifteen_minutes_across_dst() {
    // 1711846800 = 2024-03-31 01:00 UTC, the moment Berlin springs forward
    // from 02:00 CET to 03:00 CEST. The converted start must follow the zone
    // rules, not a fixed offset.
    let catalog = Catalog::standard();
    let service = catalog.service("REISEPASS").unwrap();
    let offices = single_office_slice("PASING", "2024-03-31", slots(vec![1711846800]));

    let calendar = berlin_synthesizer(fixed_instant())
        .synthesize(service, &offices, catalog)
        .unwrap();
    let rendered = calendar.to_string();

    assert!(rendered.contains("DTSTART;TZID=Europe/Berlin:20240331T030000"));
    assert!(rendered.contains("DTEND;TZID=Europe/Berlin:20240331T031500"));
}

#[test]
fn error_entries_contribute_no_events_and_do_not_fail() {
    let catalog = Catalog::standard();
    let service = catalog.service("REISEPASS").unwrap();
    let offices = single_office_slice(
        "ORLEANSPLATZ",
        "2024-05-01",
        DayEntry {
            error_code: Some("BOOKED_OUT".to_string()),
            ..Default::default()
        },
    );

    let calendar = berlin_synthesizer(fixed_instant())
        .synthesize(service, &offices, catalog)
        .unwrap();
    let rendered = calendar.to_string();

    assert_eq!(rendered.matches("BEGIN:VEVENT").count(), 0);
    assert!(rendered.contains("BEGIN:VCALENDAR"));
}

#[test]
fn event_count_is_the_sum_of_non_error_timestamp_lists() {
    let catalog = Catalog::standard();
    let service = catalog.service("PERSONALAUSWEIS").unwrap();

    let mut orleansplatz = BTreeMap::new();
    orleansplatz.insert(
        "2024-05-01".to_string(),
        slots(vec![1714546800, 1714547700]),
    );
    orleansplatz.insert("2024-05-02".to_string(), slots(vec![1714633200]));
    let mut pasing = BTreeMap::new();
    pasing.insert(
        "2024-05-01".to_string(),
        DayEntry {
            error_code: Some("noAppointmentForThisScope".to_string()),
            ..Default::default()
        },
    );
    pasing.insert(
        "2024-05-03".to_string(),
        slots(vec![1714719600, 1714720500, 1714721400]),
    );
    let mut offices = OfficeMap::new();
    offices.insert("ORLEANSPLATZ".to_string(), orleansplatz);
    offices.insert("PASING".to_string(), pasing);

    let calendar = berlin_synthesizer(fixed_instant())
        .synthesize(service, &offices, catalog)
        .unwrap();

    assert_eq!(calendar.to_string().matches("BEGIN:VEVENT").count(), 6);
}

#[test]
fn uids_are_stable_across_runs_with_different_generation_instants() {
    let catalog = Catalog::standard();
    let service = catalog.service("REISEPASS").unwrap();
    let offices = single_office_slice(
        "ORLEANSPLATZ",
        "2024-05-01",
        slots(vec![1714546800, 1714547700]),
    );

    let first = berlin_synthesizer(fixed_instant())
        .synthesize(service, &offices, catalog)
        .unwrap()
        .to_string();
    let second = berlin_synthesizer(Utc.with_ymd_and_hms(2025, 1, 1, 8, 30, 0).unwrap())
        .synthesize(service, &offices, catalog)
        .unwrap()
        .to_string();

    // DTSTAMP legitimately differs, the identities must not.
    assert_eq!(uid_lines(&first), uid_lines(&second));
}

#[test]
fn identical_inputs_render_byte_identical_calendars() {
    let catalog = Catalog::standard();
    let service = catalog.service("REISEPASS").unwrap();
    let offices = single_office_slice(
        "ORLEANSPLATZ",
        "2024-05-01",
        slots(vec![1714547700, 1714546800]),
    );

    let synthesizer = berlin_synthesizer(fixed_instant());
    let first = synthesizer.synthesize(service, &offices, catalog).unwrap();
    let second = synthesizer.synthesize(service, &offices, catalog).unwrap();

    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn calendar_metadata_names_the_service() {
    let catalog = Catalog::standard();
    let service = catalog.service("REISEPASS").unwrap();
    let offices = single_office_slice("ORLEANSPLATZ", "2024-05-01", slots(vec![1714546800]));

    let rendered = berlin_synthesizer(fixed_instant())
        .synthesize(service, &offices, catalog)
        .unwrap()
        .to_string();

    assert!(rendered.contains("PRODID:-//Appointments Buergerbuero Muenchen//REISEPASS//"));
    // PRODID must occur exactly once, not alongside the library default.
    assert_eq!(rendered.matches("PRODID").count(), 1);
    assert!(rendered.contains("VERSION:2.0"));
    assert!(rendered.contains("CALSCALE:GREGORIAN"));
    assert!(rendered.contains("METHOD:PUBLISH"));
    assert!(rendered.contains("SUMMARY:REISEPASS - ORLEANSPLATZ"));
}

#[test]
fn description_reports_missing_last_modified() {
    let catalog = Catalog::standard();
    let service = catalog.service("REISEPASS").unwrap();
    let offices = single_office_slice("ORLEANSPLATZ", "2024-05-01", slots(vec![1714546800]));

    let rendered = unfold(
        &berlin_synthesizer(fixed_instant())
            .synthesize(service, &offices, catalog)
            .unwrap()
            .to_string(),
    );

    assert!(rendered.contains("not available"));
    assert!(rendered.contains("serviceId=10225538"));
}
