use std::collections::HashMap;
use urania::chart::{equal_houses, ASCENDANT};
use urania::normalize::TextDialect;
use urania::zodiac::{degree_in_sign, sign_of};
use urania::{
    normalize, render_text, AscendantSource, CelestialBody, ChartResult, ChartSource, Motion,
    RawAstronomicalResult, Sign,
};

fn chart_with(ascendant: f64, bodies: &[(&str, f64, Motion)]) -> ChartResult {
    ChartResult {
        julian_day: 2_451_545.0,
        ascendant: CelestialBody::new(ASCENDANT, ascendant, Motion::Unknown),
        bodies: bodies
            .iter()
            .map(|(key, lon, motion)| (key.to_string(), CelestialBody::new(key, *lon, *motion)))
            .collect::<HashMap<_, _>>(),
        houses: equal_houses(ascendant),
        aspects: Vec::new(),
        source: ChartSource::Calculated,
    }
}

#[test]
fn test_sign_of_259_is_sagittarius() {
    assert_eq!(sign_of(259.0), Sign::Sagittarius);
    assert!((degree_in_sign(259.0) - 19.0).abs() < 1e-9);
}

#[test]
fn test_round_trip_across_the_zodiac() {
    let motions = [Motion::Direct, Motion::Retrograde, Motion::Unknown];
    let mut lon = 0.0;
    let mut step = 0;
    while lon < 360.0 {
        let ascendant = (lon * 7.0 + 13.0) % 360.0;
        let chart = chart_with(
            ascendant,
            &[
                ("sun", lon, motions[step % 3]),
                ("pluto", (lon + 123.456) % 360.0, motions[(step + 1) % 3]),
                ("southnode", (lon + 180.0) % 360.0, Motion::Unknown),
            ],
        );
        let text = render_text(&chart);
        let (parsed, report) = normalize(&RawAstronomicalResult::Text(text.clone()));
        assert_eq!(report.dialect, Some(TextDialect::Dms));
        assert_eq!(report.ascendant_source, AscendantSource::HouseOne);
        assert!(parsed.approx_eq(&chart, 0.01), "round trip failed for\n{}", text);
        assert!(parsed.validate().is_ok());
        lon += 7.77;
        step += 1;
    }
}

#[test]
fn test_rounding_at_sign_boundary_round_trips() {
    // 29°59'59.98" Aries renders as 0° Taurus
    let lon = 30.0 - 0.02 / 3600.0;
    let chart = chart_with(lon, &[("moon", lon, Motion::Direct)]);
    let text = render_text(&chart);
    assert!(text.contains("Moon 0° Taurus 0' 0.0\" D"));
    let (parsed, _) = normalize(&RawAstronomicalResult::Text(text));
    assert!(parsed.approx_eq(&chart, 0.01));
}

#[test]
fn test_partial_text_fills_missing_houses() {
    let text = "Planets:\n\
                Sun 19° Sagittarius 0' 0.0\"\n\
                Houses:\n\
                House 1 10° Aries 0' 0.0\"\n\
                House 10 5° Capricorn 0' 0.0\"\n\
                a line nobody understands\n";
    let (chart, report) = normalize(&RawAstronomicalResult::Text(text.to_string()));
    assert_eq!(report.houses_parsed, 2);
    assert_eq!(report.houses_synthesized, 10);
    assert_eq!(report.lines_skipped, 1);
    assert!(report.is_partial());
    assert!((chart.houses[&10].longitude - 275.0).abs() < 1e-9);
    assert!((chart.houses[&4].longitude - 100.0).abs() < 1e-9);
    assert!(chart.validate().is_ok());
}

#[test]
fn test_ascendant_line_used_without_house_one() {
    let text = "Ascendant 19° Libra 11' 24.0\"\nSun 1° Aries 0' 0.0\"\n";
    let (chart, report) = normalize(&RawAstronomicalResult::Text(text.to_string()));
    assert_eq!(report.ascendant_source, AscendantSource::AscendantLine);
    assert!((chart.ascendant.longitude - 199.19).abs() < 1e-6);
    assert!((chart.houses[&7].longitude - 19.19).abs() < 1e-6);
}

#[test]
fn test_house_one_overrides_ascendant_line() {
    let text = "Ascendant 19° Libra 0' 0.0\"\nHouse 1 20° Libra 0' 0.0\"\n";
    let (chart, report) = normalize(&RawAstronomicalResult::Text(text.to_string()));
    assert_eq!(report.ascendant_source, AscendantSource::HouseOne);
    assert!((chart.ascendant.longitude - 200.0).abs() < 1e-9);
}

#[test]
fn test_json_output_from_a_provider() {
    let json = r#"{
        "julian_day": 2451545.0,
        "planets": {
            "Sun": {"lon": 280.37, "speed_lon": 1.02},
            "North Node": {"lon": 125.04, "speed_lon": -0.05}
        },
        "houses": {"cusps": {"1": 24.0}, "angles": {"mc": 270.5}}
    }"#;
    let raw = RawAstronomicalResult::sniff(json).unwrap();
    let (chart, report) = normalize(&raw);
    assert_eq!(report.dialect, None);
    assert_eq!(report.houses_synthesized, 11);
    assert!((chart.ascendant.longitude - 24.0).abs() < 1e-9);
    assert!((chart.bodies["southnode"].longitude - 305.04).abs() < 1e-9);
    assert!((chart.bodies["midheaven"].longitude - 270.5).abs() < 1e-9);
}
