use crate::aspects::types::{Aspect, AspectKind, AspectSettings, AspectStrength, ASPECT_PRIORITY};
use crate::chart::CelestialBody;
use crate::zodiac::angular_separation;
use std::collections::HashMap;

/// Aspect calculator
pub struct AspectCalculator;

impl AspectCalculator {
    /// Create a new aspect calculator
    pub fn new() -> Self {
        Self
    }

    /// Classify every unordered pair of bodies that is not excluded.
    ///
    /// Pairs are visited in key order so the output is stable across runs.
    pub fn compute(
        &self,
        bodies: &HashMap<String, CelestialBody>,
        settings: &AspectSettings,
    ) -> Vec<Aspect> {
        let mut keys: Vec<&String> = bodies
            .keys()
            .filter(|key| !settings.exclude.iter().any(|ex| ex == *key))
            .collect();
        keys.sort();

        let mut aspects = Vec::new();
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let a = &bodies[keys[i]];
                let b = &bodies[keys[j]];
                if let Some(aspect) = self.aspect_between(a, b, settings) {
                    aspects.push(aspect);
                }
            }
        }
        aspects
    }

    /// Aspect formed by two bodies, if any.
    pub fn aspect_between(
        &self,
        a: &CelestialBody,
        b: &CelestialBody,
        settings: &AspectSettings,
    ) -> Option<Aspect> {
        let (kind, orb) = self.classify(a.longitude, b.longitude, settings)?;
        let (first, second) = if a.key <= b.key {
            (&a.key, &b.key)
        } else {
            (&b.key, &a.key)
        };
        let strength = if orb < settings.strong_orb {
            AspectStrength::Strong
        } else {
            AspectStrength::Moderate
        };
        Some(Aspect {
            first: first.clone(),
            second: second.clone(),
            kind,
            angle: kind.angle(),
            orb,
            strength,
            glyph: kind.glyph(),
        })
    }

    /// First aspect in priority order whose orb covers the separation.
    pub fn classify(
        &self,
        lon1: f64,
        lon2: f64,
        settings: &AspectSettings,
    ) -> Option<(AspectKind, f64)> {
        let separation = angular_separation(lon1, lon2);
        ASPECT_PRIORITY.iter().find_map(|kind| {
            let orb = (separation - kind.angle()).abs();
            (orb <= settings.orb_for(*kind)).then_some((*kind, orb))
        })
    }
}

impl Default for AspectCalculator {
    fn default() -> Self {
        Self::new()
    }
}
