use urania::ephemeris::{HousePositions, PlanetPosition, StructuredPositions};
use urania::{
    compute_chart, AspectKind, AspectSettings, AspectStrength, BirthData, ChartError,
    EphemerisSettings, LocationResolver, Motion, PositionCalculator, RawAstronomicalResult,
    StaticProvider,
};
use std::collections::HashMap;

fn swetest_listing() -> RawAstronomicalResult {
    RawAstronomicalResult::Text(
        "Sun              259.2096000   1.0191000\n\
         Moon             223.3367000  13.2000000\n\
         Mercury          249.2096000  -0.3500000\n\
         Venus            229.2096000   1.2000000\n\
         true Node         35.1200000  -0.0530000\n\
         mean Apogee      102.0000000   0.1100000\n\
         house  1         199.1900000\n\
         house  2         229.1900000\n\
         house  3         259.1900000\n\
         house  4         289.1900000\n\
         house  5         319.1900000\n\
         house  6         349.1900000\n\
         house  7          19.1900000\n\
         house  8          49.1900000\n\
         house  9          79.1900000\n\
         house 10         109.1900000\n\
         house 11         139.1900000\n\
         house 12         169.1900000\n\
         Ascendant        199.1900000\n\
         MC               110.0000000\n\
         ARMC             112.4000000\n"
            .to_string(),
    )
}

#[test]
fn test_mumbai_chart_end_to_end() {
    let birth = BirthData::parse("11.12.1985", "07:05", "Mumbai, IN").unwrap();
    let resolver = LocationResolver::default();
    let calculator = PositionCalculator::new(
        StaticProvider::new(swetest_listing()),
        EphemerisSettings::default(),
    );

    let (chart, location, zone) =
        compute_chart(&birth, &resolver, &calculator, &AspectSettings::default()).unwrap();

    assert_eq!(location.country_code, "IN");
    assert_eq!(zone.total_offset_minutes, 330);
    assert_eq!(zone.offset_hours, 5);
    assert_eq!(zone.offset_minutes, 30);

    assert!(!chart.is_placeholder());
    assert!(chart.validate().is_ok());
    assert!((chart.ascendant.longitude - 199.19).abs() < 1e-9);
    assert_eq!(chart.bodies["mercury"].motion, Motion::Retrograde);
    assert!(chart.bodies.contains_key("southnode"));
    assert!(chart.bodies.contains_key("lilith"));

    // Sun and Mercury sit 10° apart, Sun and Venus 30°
    assert!(!chart
        .aspects
        .iter()
        .any(|a| a.first == "mercury" && a.second == "sun"));
    // The mirrored South Node never pairs
    assert!(chart
        .aspects
        .iter()
        .all(|a| a.first != "southnode" && a.second != "southnode"));
    // Moon 223.34 and Venus 229.21 are conjunct
    let conj = chart
        .aspects
        .iter()
        .find(|a| a.first == "moon" && a.second == "venus")
        .unwrap();
    assert_eq!(conj.kind, AspectKind::Conjunction);
    assert_eq!(conj.strength, AspectStrength::Moderate);
}

#[test]
fn test_failing_provider_still_yields_flagged_chart() {
    let birth = BirthData::parse("01.01.2000", "12:00", "London").unwrap();
    let resolver = LocationResolver::default();
    let calculator = PositionCalculator::new(
        StaticProvider::failing("swetest not installed"),
        EphemerisSettings::default(),
    );

    let (chart, _, zone) =
        compute_chart(&birth, &resolver, &calculator, &AspectSettings::default()).unwrap();
    assert_eq!(zone.total_offset_minutes, 0);
    assert_eq!(zone.dst, Some(false));
    assert!(chart.is_placeholder());
    assert!(chart.validate().is_ok());
    assert!(chart.aspects.is_empty());
}

#[test]
fn test_unknown_location_is_reported() {
    let birth = BirthData::parse("01.01.2000", "12:00", "Atlantis").unwrap();
    let calculator = PositionCalculator::new(
        StaticProvider::new(swetest_listing()),
        EphemerisSettings::default(),
    );
    let err = compute_chart(
        &birth,
        &LocationResolver::default(),
        &calculator,
        &AspectSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ChartError::LocationNotFound { .. }));
    assert!(err.is_user_correctable());
}

#[test]
fn test_malformed_submission_rejected_before_lookup() {
    for (date, time, location) in [
        ("1985-12-11", "07:05", "Mumbai"),
        ("11.12.1985", "7:05", "Mumbai"),
        ("11.12.1985", "24:00", "Mumbai"),
        ("31.02.1985", "07:05", "Mumbai"),
        ("11.12.1985", "07:05", "12345"),
    ] {
        let err = BirthData::parse(date, time, location).unwrap_err();
        assert!(
            matches!(err, ChartError::InvalidInputFormat { .. }),
            "{} {} {}",
            date,
            time,
            location
        );
    }
}

#[test]
fn test_structured_provider_output() {
    let positions = StructuredPositions {
        julian_day: Some(2_451_545.0),
        planets: HashMap::from([
            ("sun".to_string(), PlanetPosition { lon: 280.37, speed_lon: Some(1.02) }),
            ("moon".to_string(), PlanetPosition { lon: 10.37, speed_lon: Some(12.5) }),
        ]),
        houses: Some(HousePositions {
            system: "equal".to_string(),
            cusps: (1..=12)
                .map(|n| (n.to_string(), (100.0 + (n as f64 - 1.0) * 30.0) % 360.0))
                .collect(),
            angles: HashMap::from([("asc".to_string(), 100.0), ("mc".to_string(), 8.5)]),
        }),
    };
    let birth = BirthData::parse("01.01.2000", "13:00", "Paris, France").unwrap();
    let calculator = PositionCalculator::new(
        StaticProvider::new(RawAstronomicalResult::Structured(positions)),
        EphemerisSettings::default(),
    );
    let (chart, location, zone) = compute_chart(
        &birth,
        &LocationResolver::default(),
        &calculator,
        &AspectSettings::default(),
    )
    .unwrap();

    assert_eq!(location.country_code, "FR");
    assert_eq!(zone.total_offset_minutes, 60);
    assert!((chart.julian_day - 2_451_545.0).abs() < 1e-9);
    assert!((chart.ascendant.longitude - 100.0).abs() < 1e-9);
    assert!((chart.midheaven().unwrap().longitude - 8.5).abs() < 1e-9);

    // Sun 280.37 and Moon 10.37 are a square, orb 0
    let square = chart
        .aspects
        .iter()
        .find(|a| a.first == "moon" && a.second == "sun")
        .unwrap();
    assert_eq!(square.kind, AspectKind::Square);
    assert!(square.orb < 1e-6);
    assert_eq!(square.strength, AspectStrength::Strong);
}
