use super::Extracted;
use crate::chart::{canonical_key, Motion, ASCENDANT, MIDHEAVEN};
use crate::ephemeris::StructuredPositions;

pub(super) fn extract(positions: &StructuredPositions) -> Extracted {
    let mut extracted = Extracted {
        julian_day: positions.julian_day,
        ..Extracted::default()
    };

    // Sorted so that two aliases of one body resolve the same way every run
    let mut names: Vec<&String> = positions.planets.keys().collect();
    names.sort();
    for name in names {
        let position = &positions.planets[name];
        match canonical_key(name) {
            Some(key) => {
                extracted.insert_body(key, position.lon, Motion::from_speed(position.speed_lon))
            }
            None => log::debug!("Ignoring unknown body {:?}", name),
        }
    }

    if let Some(houses) = &positions.houses {
        for (label, lon) in &houses.cusps {
            match label.trim().parse::<u8>() {
                Ok(n) if (1..=12).contains(&n) => {
                    extracted.cusps.insert(n, *lon);
                }
                _ => log::debug!("Ignoring cusp label {:?}", label),
            }
        }
        for (name, lon) in &houses.angles {
            match canonical_key(name) {
                Some(ASCENDANT) => extracted.provider_ascendant = Some(*lon),
                Some(MIDHEAVEN) => extracted.provider_midheaven = Some(*lon),
                _ => log::debug!("Ignoring angle {:?}", name),
            }
        }
    }
    extracted
}
