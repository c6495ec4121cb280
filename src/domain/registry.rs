//! Static zone → location registry.
//!
//! Each load zone maps to the coordinates and IANA timezone used for its
//! weather requests. Zones that have a stored model but no entry here are
//! warned about and produce a sentinel record, never a hard failure.

/// Geographic anchor for one load zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name passed to the weather API so that returned hourly
    /// timestamps are already zone-local.
    pub timezone: &'static str,
}

const ET: &str = "America/New_York";

/// All known load zones with their representative coordinates.
pub const ZONE_LOCATIONS: &[(&str, ZoneLocation)] = &[
    ("AECO", ZoneLocation { latitude: 39.36, longitude: -74.42, timezone: ET }),
    ("AEP", ZoneLocation { latitude: 39.96, longitude: -83.00, timezone: ET }),
    ("AEPAPT", ZoneLocation { latitude: 37.27, longitude: -79.94, timezone: ET }),
    ("AEPIMP", ZoneLocation { latitude: 41.08, longitude: -85.14, timezone: "America/Indiana/Indianapolis" }),
    ("AEPKPT", ZoneLocation { latitude: 38.48, longitude: -82.64, timezone: ET }),
    ("AEPOPT", ZoneLocation { latitude: 40.80, longitude: -81.38, timezone: ET }),
    ("AP", ZoneLocation { latitude: 40.30, longitude: -79.54, timezone: ET }),
    ("BC", ZoneLocation { latitude: 39.29, longitude: -76.61, timezone: ET }),
    ("BGE", ZoneLocation { latitude: 39.29, longitude: -76.61, timezone: ET }),
    ("CE", ZoneLocation { latitude: 41.50, longitude: -81.69, timezone: ET }),
    ("COMED", ZoneLocation { latitude: 41.88, longitude: -87.63, timezone: "America/Chicago" }),
    ("DAY", ZoneLocation { latitude: 39.76, longitude: -84.19, timezone: ET }),
    ("DEOK", ZoneLocation { latitude: 39.10, longitude: -84.51, timezone: ET }),
    ("DOM", ZoneLocation { latitude: 37.54, longitude: -77.43, timezone: ET }),
    ("DPLCO", ZoneLocation { latitude: 39.75, longitude: -75.55, timezone: ET }),
    ("DUQ", ZoneLocation { latitude: 40.44, longitude: -79.99, timezone: ET }),
    ("EASTON", ZoneLocation { latitude: 38.77, longitude: -76.08, timezone: ET }),
    ("EKPC", ZoneLocation { latitude: 37.99, longitude: -84.18, timezone: ET }),
    ("JC", ZoneLocation { latitude: 40.80, longitude: -74.48, timezone: ET }),
    ("ME", ZoneLocation { latitude: 40.34, longitude: -75.93, timezone: ET }),
    ("OE", ZoneLocation { latitude: 41.08, longitude: -81.52, timezone: ET }),
    ("OVEC", ZoneLocation { latitude: 39.06, longitude: -83.01, timezone: ET }),
    ("PAPWR", ZoneLocation { latitude: 40.61, longitude: -75.49, timezone: ET }),
    ("PE", ZoneLocation { latitude: 39.95, longitude: -75.16, timezone: ET }),
    ("PEPCO", ZoneLocation { latitude: 38.91, longitude: -77.04, timezone: ET }),
    ("PLCO", ZoneLocation { latitude: 40.61, longitude: -75.49, timezone: ET }),
    ("PN", ZoneLocation { latitude: 42.13, longitude: -80.09, timezone: ET }),
    ("PS", ZoneLocation { latitude: 40.73, longitude: -74.17, timezone: ET }),
    ("PSEG", ZoneLocation { latitude: 40.73, longitude: -74.17, timezone: ET }),
    ("RECO", ZoneLocation { latitude: 41.09, longitude: -74.05, timezone: ET }),
    ("SMECO", ZoneLocation { latitude: 38.52, longitude: -76.80, timezone: ET }),
    ("UGI", ZoneLocation { latitude: 41.25, longitude: -75.88, timezone: ET }),
    ("VMEU", ZoneLocation { latitude: 39.49, longitude: -75.03, timezone: ET }),
];

/// Look up the location for a zone code.
pub fn zone_location(zone: &str) -> Option<&'static ZoneLocation> {
    ZONE_LOCATIONS
        .iter()
        .find(|(code, _)| *code == zone)
        .map(|(_, loc)| loc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_zone_resolves() {
        let loc = zone_location("COMED").unwrap();
        assert_eq!(loc.timezone, "America/Chicago");
        assert!((loc.latitude - 41.88).abs() < 1e-9);
    }

    #[test]
    fn unknown_zone_is_none() {
        assert!(zone_location("NOPE").is_none());
    }

    #[test]
    fn registry_codes_are_unique() {
        for (i, (a, _)) in ZONE_LOCATIONS.iter().enumerate() {
            for (b, _) in &ZONE_LOCATIONS[i + 1..] {
                assert_ne!(a, b, "duplicate registry entry {a}");
            }
        }
    }
}
