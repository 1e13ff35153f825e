use std::fmt::Write;

use crate::chart::{display_name, CelestialBody, ChartResult, Motion};
use crate::zodiac::split_longitude;

fn position(longitude: f64) -> String {
    let (sign, dms) = split_longitude(longitude);
    format!(
        "{}° {} {}' {:.1}\"",
        dms.degrees,
        sign.name(),
        dms.minutes,
        dms.seconds
    )
}

fn label(key: &str) -> &str {
    display_name(key).unwrap_or(key)
}

fn body_line(body: &CelestialBody) -> String {
    let marker = match body.motion {
        Motion::Retrograde => " R",
        Motion::Direct => " D",
        Motion::Unknown => "",
    };
    format!("{} {}{}", label(&body.key), position(body.longitude), marker)
}

/// Render the chart in the DMS text layout the normalizer reads back.
pub fn render_text(chart: &ChartResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Julian Day: {:.6}", chart.julian_day);
    out.push_str("Planets:\n");
    let _ = writeln!(out, "{}", body_line(&chart.ascendant));
    for body in chart.sorted_bodies() {
        let _ = writeln!(out, "{}", body_line(body));
    }
    out.push_str("Houses:\n");
    for (house, cusp) in &chart.houses {
        let _ = writeln!(out, "House {} {}", house, position(cusp.longitude));
    }
    out
}

/// [`render_text`] followed by an `Aspects:` listing.
pub fn render_summary(chart: &ChartResult) -> String {
    let mut out = render_text(chart);
    out.push_str("Aspects:\n");
    for aspect in &chart.aspects {
        let _ = writeln!(
            out,
            "{} {} {} {} (orb {:.2}°, {})",
            aspect.glyph,
            label(&aspect.first),
            aspect.kind,
            label(&aspect.second),
            aspect.orb,
            aspect.strength
        );
    }
    if chart.is_placeholder() {
        out.push_str("(placeholder chart: positions unavailable)\n");
    }
    out
}
