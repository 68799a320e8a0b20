use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One office+service+date cell as returned by the slot-availability
/// endpoint. The backend either reports an error code for the day or a list
/// of bookable start times; an entry carrying an error code contributes no
/// events downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Appointment start times, epoch seconds.
    #[serde(
        rename = "appointmentTimestamps",
        skip_serializing_if = "Option::is_none"
    )]
    pub appointment_timestamps: Option<Vec<i64>>,
    /// Epoch milliseconds, when the backend last touched this day.
    #[serde(rename = "lastModified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

impl DayEntry {
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }

    pub fn timestamps(&self) -> &[i64] {
        self.appointment_timestamps.as_deref().unwrap_or_default()
    }
}

pub type DateMap = BTreeMap<String, DayEntry>;
pub type OfficeMap = BTreeMap<String, DateMap>;

/// The full collected availability picture: service → office → date → entry.
/// BTreeMaps keep iteration and serialization order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(pub BTreeMap<String, OfficeMap>);

impl Dataset {
    pub fn load(path: &Path) -> Result<Dataset> {
        let file =
            File::open(path).with_context(|| format!("opening dataset {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("decoding dataset {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("creating dataset {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing dataset {}", path.display()))
    }

    pub fn service_slice(&self, service: &str) -> Option<&OfficeMap> {
        self.0.get(service)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OfficeMap)> {
        self.0.iter()
    }
}

/// Accumulates collected pairs and exposes the finished dataset in a single
/// step, so nothing downstream ever sees a half-built structure.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    inner: BTreeMap<String, OfficeMap>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one collected (service, office) pair. An empty date map still
    /// registers the pair, mirroring the wire dataset where a queried office
    /// without available days is present but empty.
    pub fn insert_pair(&mut self, service: &str, office: &str, dates: DateMap) {
        self.inner
            .entry(service.to_string())
            .or_default()
            .insert(office.to_string(), dates);
    }

    pub fn finalize(self) -> Dataset {
        Dataset(self.inner)
    }
}
