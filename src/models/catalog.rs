use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde_json::{Map, Value, json};

/// A Bürgerbüro location accepting appointments.
///
/// Only the numeric id ever crosses the wire; the name keys the dataset, the
/// verbose name is for human-facing listings, and the address ends up in the
/// calendar LOCATION field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeRef {
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub office_id: u32,
    pub address: &'static str,
}

/// A bookable service (appointment category) of the scheduling backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRef {
    pub name: &'static str,
    pub service_id: u32,
}

pub static OFFICES: &[OfficeRef] = &[
    OfficeRef {
        name: "ORLEANSPLATZ",
        verbose_name: "Bürgerbüro Orleansplatz",
        office_id: 10187259,
        address: "BÜRGERBÜRO ORLEANSPLATZ, ORLEANSPLATZ 11, 81667 MÜNCHEN",
    },
    OfficeRef {
        name: "LEONRODSTRASSE",
        verbose_name: "Bürgerbüro Leonrodstraße",
        office_id: 10187253,
        address: "BÜRGERBÜRO LEONRODSTRASSE, LEONRODSTRASSE 21, 80634 MÜNCHEN",
    },
    OfficeRef {
        name: "RIESENFELDSTRASSE",
        verbose_name: "Bürgerbüro Riesenfeldstraße",
        office_id: 10187255,
        address: "BÜRGERBÜRO RIESENFELDSTRASSE, RIESENFELDSTRASSE 75, 80809 MÜNCHEN",
    },
    OfficeRef {
        name: "FORSTENRIEDER_ALLEE",
        verbose_name: "Bürgerbüro Forstenrieder Allee",
        office_id: 10187257,
        address: "BÜRGERBÜRO FORSTENRIEDER ALLEE, FORSTENRIEDER ALLEE 61A, 81476 MÜNCHEN",
    },
    OfficeRef {
        name: "PASING",
        verbose_name: "Bürgerbüro Pasing",
        office_id: 10187261,
        address: "BÜRGERBÜRO PASING, LANDSBERGER STRASSE 486, 81241 MÜNCHEN",
    },
    OfficeRef {
        name: "RUPPERTSTRASSE",
        verbose_name: "Bürgerbüro Ruppertstraße",
        office_id: 10187251,
        address: "BÜRGERBÜRO RUPPERTSTRASSE, RUPPERTSTRASSE 19, 80466 MÜNCHEN",
    },
    OfficeRef {
        name: "AUSLAENDERBEHOERDE",
        verbose_name: "Ausländerbehörde München",
        office_id: 10187263,
        address: "AUSLÄNDERBEHÖRDE, RUPPERTSTRASSE 19, 80466 MÜNCHEN",
    },
];

pub static SERVICES: &[ServiceRef] = &[
    ServiceRef {
        name: "REISEPASS",
        service_id: 10225538,
    },
    ServiceRef {
        name: "PERSONALAUSWEIS",
        service_id: 10225539,
    },
    ServiceRef {
        name: "MELDEBESCHEINIGUNG",
        service_id: 10225537,
    },
    ServiceRef {
        name: "FUEHRUNGSZEUGNIS",
        service_id: 10225545,
    },
    ServiceRef {
        name: "WOHNSITZ_ANMELDUNG",
        service_id: 10225533,
    },
    ServiceRef {
        name: "NOTFALL_HILFE_AUFENTHALTSTITEL_BESCHAEFTIGTE_ANGEHOERIGE",
        service_id: 10339027,
    },
];

// Services the backend only offers at specific offices. Querying any other
// combination returns nothing useful, so those pairs are skipped up front
// instead of being inferred from failed calls.
static RESTRICTED_SERVICES: &[(&str, &[&str])] = &[(
    "NOTFALL_HILFE_AUFENTHALTSTITEL_BESCHAEFTIGTE_ANGEHOERIGE",
    &["AUSLAENDERBEHOERDE"],
)];

/// Immutable lookup over the static office and service tables.
pub struct Catalog {
    offices_by_name: BTreeMap<&'static str, &'static OfficeRef>,
    services_by_name: BTreeMap<&'static str, &'static ServiceRef>,
}

static CATALOG: Lazy<Catalog> = Lazy::new(|| Catalog {
    offices_by_name: OFFICES.iter().map(|o| (o.name, o)).collect(),
    services_by_name: SERVICES.iter().map(|s| (s.name, s)).collect(),
});

impl Catalog {
    pub fn standard() -> &'static Catalog {
        &CATALOG
    }

    pub fn office(&self, name: &str) -> Option<&'static OfficeRef> {
        self.offices_by_name.get(name).copied()
    }

    pub fn service(&self, name: &str) -> Option<&'static ServiceRef> {
        self.services_by_name.get(name).copied()
    }

    /// Offices in table order.
    pub fn offices(&self) -> impl Iterator<Item = &'static OfficeRef> {
        OFFICES.iter()
    }

    /// Services in table order.
    pub fn services(&self) -> impl Iterator<Item = &'static ServiceRef> {
        SERVICES.iter()
    }

    /// Whether the backend offers this service at this office at all.
    pub fn is_offered(&self, service: &ServiceRef, office: &OfficeRef) -> bool {
        match RESTRICTED_SERVICES
            .iter()
            .find(|(name, _)| *name == service.name)
        {
            Some((_, allowed)) => allowed.contains(&office.name),
            None => true,
        }
    }

    /// Reference tables as JSON, in the shape the static results viewer reads.
    pub fn to_json(&self) -> Value {
        let offices: Map<String, Value> = self
            .offices()
            .map(|o| {
                (
                    o.name.to_string(),
                    json!({
                        "verbose_name": o.verbose_name,
                        "office_id": o.office_id,
                        "address": o.address,
                    }),
                )
            })
            .collect();
        let services: Map<String, Value> = self
            .services()
            .map(|s| (s.name.to_string(), json!(s.service_id)))
            .collect();
        json!({ "offices": offices, "services": services })
    }
}
