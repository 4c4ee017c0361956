use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_weight(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Hue in `[0, 1)` derived from a tag, stable across runs of the same build.
pub fn stable_hue(tag: &str) -> f32 {
    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    let hash = hasher.finish();
    ((hash & 0xffff_ffff) as f64 / (u32::MAX as f64 + 1.0)) as f32
}
