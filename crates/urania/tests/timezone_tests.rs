use std::sync::Arc;
use urania::location::{parse_offset_label, LocationDatabase, ZoneChain, ZoneQuery, ZoneStrategy};
use urania::{CivilInstant, LocationResolver, TimeZoneInfo};

#[test]
fn test_offset_label_totals() {
    for (label, total) in [
        ("UTC+05:30", 330),
        ("UTC-03:30", -210),
        ("UTC+5:45", 345),
        ("UTC-10:00", -600),
        ("UTC+0:00", 0),
        ("GMT+14:00", 840),
    ] {
        assert_eq!(parse_offset_label(label).unwrap(), total, "{}", label);
    }
    let india = TimeZoneInfo::from_label("Asia/Kolkata", "UTC+05:30", None).unwrap();
    assert_eq!((india.offset_hours, india.offset_minutes), (5, 30));
    assert!(parse_offset_label("UTC+5").is_ok());
    assert!(parse_offset_label("UTC+15:00").is_err());
    assert!(parse_offset_label("IST").is_err());
}

#[test]
fn test_political_boundaries_win_over_longitude() {
    let resolver = LocationResolver::default();
    // Longitude alone would give UTC+5 for Mumbai and UTC+6 for Urumqi
    let (_, mumbai) = resolver.resolve("Mumbai, IN", None).unwrap();
    assert_eq!(mumbai.total_offset_minutes, 330);
    let (_, urumqi) = resolver.resolve("Urumqi", None).unwrap();
    assert_eq!(urumqi.total_offset_minutes, 480);
    assert_eq!(urumqi.dst, None);
}

#[test]
fn test_united_states_routing_and_dst() {
    let resolver = LocationResolver::default();
    let july = CivilInstant::new(1990, 7, 4, 12, 0, 0).unwrap();
    let january = CivilInstant::new(1990, 1, 4, 12, 0, 0).unwrap();

    let (_, denver_summer) = resolver.resolve("Denver", Some(july)).unwrap();
    assert_eq!(denver_summer.total_offset_minutes, -360);
    assert_eq!(denver_summer.dst, Some(true));
    let (_, denver_winter) = resolver.resolve("Denver", Some(january)).unwrap();
    assert_eq!(denver_winter.total_offset_minutes, -420);

    let (_, honolulu) = resolver.resolve("Honolulu", Some(july)).unwrap();
    assert_eq!(honolulu.total_offset_minutes, -600);
    assert_eq!(honolulu.dst, Some(false));
}

#[test]
fn test_open_ocean_uses_longitude_bucket() {
    let resolver = LocationResolver::default();
    let zone = resolver.timezone_for(-150.0, -40.0, None).unwrap();
    assert_eq!(zone.total_offset_minutes, -600);
    assert_eq!(zone.label, "UTC-10:00");
    // 190°E wraps to -170°
    let wrapped = resolver.timezone_for(190.0, -40.0, None).unwrap();
    assert_eq!(wrapped.total_offset_minutes, -660);
}

struct FixedTier;

impl ZoneStrategy for FixedTier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn resolve(&self, _query: &ZoneQuery<'_>) -> Option<TimeZoneInfo> {
        Some(TimeZoneInfo::from_total_minutes("Test/Fixed", 345, None))
    }
}

#[test]
fn test_new_tier_can_be_inserted() {
    let mut chain = ZoneChain::standard(LocationDatabase::builtin(), 5.0);
    chain.insert(0, Box::new(FixedTier));
    assert_eq!(chain.tier_names()[0], "fixed");
    let zone = chain.resolve(&ZoneQuery::coordinates(0.0, 0.0, None));
    assert_eq!(zone.total_offset_minutes, 345);
}

#[test]
fn test_extra_gazetteer_entries() {
    let extra = LocationDatabase::from_toml_str(
        r#"
        [[location]]
        name = "Kathmandu"
        country = "np"
        lat = 27.7172
        lon = 85.3240
        zone = { name = "Asia/Kathmandu", offset = "UTC+5:45", dst = "none" }
        "#,
    )
    .unwrap();
    let database = Arc::new(LocationDatabase::builtin().extended(extra));
    let resolver = LocationResolver::new(database, 5.0);
    let (location, zone) = resolver.resolve("kathmandu, NP", None).unwrap();
    assert_eq!(location.country_code, "NP");
    assert_eq!(zone.total_offset_minutes, 345);
    assert_eq!(zone.name, "Asia/Kathmandu");
}
