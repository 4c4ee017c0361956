//! Three-ring radial placement: the focus in the middle, its children on a ring
//! around it, and each child's children on an outward arc behind that child.

use std::f32::consts::{PI, TAU};

use tracing::{debug, instrument};

use crate::tree::{BubbleTree, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Focus = 0,
    Child = 1,
    Grandchild = 2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBubble {
    pub id: String,
    pub node: NodeId,
    pub name: String,
    pub tier: Tier,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
    pub parent_id: Option<String>,
}

impl PlacedBubble {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    pub fn distance_to(&self, other: &PlacedBubble) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Layout constants. Fractions are relative to the canvas side length.
#[derive(Clone, Debug, PartialEq)]
pub struct PackConfig {
    pub focus_fraction: f32,
    pub min_focus_radius: f32,
    pub max_focus_radius: f32,
    pub child_fraction: f32,
    pub child_growth: f32,
    pub child_min_fraction: f32,
    pub child_max_fraction: f32,
    pub min_child_radius: f32,
    pub grandchild_ratio: f32,
    pub grandchild_max_fraction: f32,
    pub min_grandchild_radius: f32,
    pub ring_margin_fraction: f32,
    pub min_ring_margin: f32,
    pub gap_fraction: f32,
    pub min_gap: f32,
    pub safety_margin: f32,
    pub grandchild_arc_degrees: f32,
    pub min_shrink_ratio: f32,
    pub relaxation_passes: usize,
    pub start_angle: f32,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            focus_fraction: 0.14,
            min_focus_radius: 40.0,
            max_focus_radius: 120.0,
            child_fraction: 0.06,
            child_growth: 0.08,
            child_min_fraction: 0.045,
            child_max_fraction: 0.10,
            min_child_radius: 10.0,
            grandchild_ratio: 0.45,
            grandchild_max_fraction: 0.04,
            min_grandchild_radius: 5.0,
            ring_margin_fraction: 0.03,
            min_ring_margin: 12.0,
            gap_fraction: 0.015,
            min_gap: 6.0,
            safety_margin: 4.0,
            grandchild_arc_degrees: 150.0,
            min_shrink_ratio: 0.65,
            relaxation_passes: 1,
            start_angle: -PI / 2.0,
        }
    }
}

impl PackConfig {
    fn focus_radius(&self, side: f32) -> f32 {
        (side * self.focus_fraction).clamp(self.min_focus_radius, self.max_focus_radius)
    }

    fn child_radius(&self, side: f32, grandchildren: usize) -> f32 {
        let lo = (side * self.child_min_fraction).max(self.min_child_radius);
        let hi = (side * self.child_max_fraction).max(lo);
        let growth = 1.0 + self.child_growth * grandchildren as f32;
        (side * self.child_fraction * growth).clamp(lo, hi)
    }

    fn grandchild_radius(&self, side: f32, child_radius: f32) -> f32 {
        let lo = self.min_grandchild_radius;
        let hi = (side * self.grandchild_max_fraction).max(lo);
        (child_radius * self.grandchild_ratio).clamp(lo, hi)
    }

    fn ring_margin(&self, side: f32) -> f32 {
        (side * self.ring_margin_fraction).max(self.min_ring_margin)
    }

    fn gap(&self, side: f32) -> f32 {
        (side * self.gap_fraction).max(self.min_gap)
    }

    fn grandchild_span(&self) -> f32 {
        self.grandchild_arc_degrees.clamp(1.0, 179.0).to_radians()
    }
}

struct ChildSlot {
    id: NodeId,
    radius: f32,
    angle: f32,
    x: f32,
    y: f32,
}

/// Places `focus`, its children and grandchildren with the default [`PackConfig`].
pub fn pack(tree: &BubbleTree, focus: NodeId, canvas_side: f32) -> Vec<PlacedBubble> {
    pack_with(tree, focus, canvas_side, &PackConfig::default())
}

#[instrument(level = "debug", skip(tree, config))]
pub fn pack_with(
    tree: &BubbleTree,
    focus: NodeId,
    canvas_side: f32,
    config: &PackConfig,
) -> Vec<PlacedBubble> {
    let Some(focus_node) = tree.get(focus) else {
        return Vec::new();
    };

    let side = if canvas_side.is_finite() {
        canvas_side.max(0.0)
    } else {
        0.0
    };
    let center = side / 2.0;
    let focus_radius = config.focus_radius(side);

    let children = tree.children(focus);
    let mut bubbles = Vec::with_capacity(1 + children.len() + tree.grandchild_count(focus));
    bubbles.push(PlacedBubble {
        id: focus_node.lineage_id.clone(),
        node: focus,
        name: focus_node.name.clone(),
        tier: Tier::Focus,
        radius: focus_radius,
        x: center,
        y: center,
        parent_id: None,
    });

    if children.is_empty() {
        return bubbles;
    }

    let gap = config.gap(side);
    let margin = config.ring_margin(side);
    let radii = children
        .iter()
        .map(|child| config.child_radius(side, tree.children(*child).len()))
        .collect::<Vec<_>>();

    let angles = sweep_angles(&radii, gap, config.start_angle);
    let ring = child_ring_radius(&radii, &angles, focus_radius, gap, margin);

    let slots = children
        .iter()
        .zip(radii.iter().zip(angles.iter()))
        .map(|(id, (&radius, &angle))| ChildSlot {
            id: *id,
            radius,
            angle,
            x: center + ring * angle.cos(),
            y: center + ring * angle.sin(),
        })
        .collect::<Vec<_>>();

    for (index, slot) in slots.iter().enumerate() {
        let child = tree.node(slot.id);
        bubbles.push(PlacedBubble {
            id: child.lineage_id.clone(),
            node: slot.id,
            name: child.name.clone(),
            tier: Tier::Child,
            radius: slot.radius,
            x: slot.x,
            y: slot.y,
            parent_id: Some(focus_node.lineage_id.clone()),
        });

        let grandchildren = tree.children(slot.id);
        if grandchildren.is_empty() {
            continue;
        }

        let neighbours = neighbour_indices(index, slots.len());
        let (radius, orbit) = grandchild_orbit(
            config,
            side,
            gap,
            slot,
            grandchildren.len(),
            neighbours.iter().map(|&neighbour| &slots[neighbour]),
        );

        let step = (2.0 * radius + gap) / orbit.max(f32::EPSILON);
        let middle = (grandchildren.len() as f32 - 1.0) / 2.0;
        for (offset, grandchild_id) in grandchildren.iter().enumerate() {
            let grandchild = tree.node(*grandchild_id);
            let angle = slot.angle + (offset as f32 - middle) * step;
            bubbles.push(PlacedBubble {
                id: grandchild.lineage_id.clone(),
                node: *grandchild_id,
                name: grandchild.name.clone(),
                tier: Tier::Grandchild,
                radius,
                x: slot.x + orbit * angle.cos(),
                y: slot.y + orbit * angle.sin(),
                parent_id: Some(child.lineage_id.clone()),
            });
        }
    }

    debug!(bubbles = bubbles.len(), ring, "packed focus");
    bubbles
}

/// Each child owns an angular share proportional to its diameter plus gap and sits
/// at the middle of that share.
fn sweep_angles(radii: &[f32], gap: f32, start_angle: f32) -> Vec<f32> {
    let total = radii
        .iter()
        .map(|radius| 2.0 * radius + gap)
        .sum::<f32>()
        .max(f32::EPSILON);

    let mut cursor = start_angle;
    radii
        .iter()
        .map(|radius| {
            let share = TAU * (2.0 * radius + gap) / total;
            let angle = cursor + share / 2.0;
            cursor += share;
            angle
        })
        .collect()
}

fn child_ring_radius(
    radii: &[f32],
    angles: &[f32],
    focus_radius: f32,
    gap: f32,
    margin: f32,
) -> f32 {
    let max_radius = radii.iter().copied().fold(0.0_f32, f32::max);
    let clear_focus = focus_radius + max_radius + margin;
    let circumference = radii.iter().map(|radius| 2.0 * radius + gap).sum::<f32>() / TAU;

    // Arc length alone under-estimates the straight-line distance, so every pair is
    // also checked by chord.
    let mut clear_chords = 0.0_f32;
    for i in 0..radii.len() {
        for j in (i + 1)..radii.len() {
            let separation = angular_distance(angles[i], angles[j]);
            let half_sin = (separation / 2.0).sin().max(1e-4);
            let needed = (radii[i] + radii[j] + gap / 2.0) / (2.0 * half_sin);
            clear_chords = clear_chords.max(needed);
        }
    }

    clear_focus.max(circumference).max(clear_chords)
}

fn angular_distance(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(TAU);
    diff.min(TAU - diff)
}

fn neighbour_indices(index: usize, count: usize) -> Vec<usize> {
    match count {
        0 | 1 => Vec::new(),
        2 => vec![1 - index],
        _ => vec![(index + count - 1) % count, (index + 1) % count],
    }
}

/// Returns the grandchild radius and the orbit radius around the owning child.
fn grandchild_orbit<'a>(
    config: &PackConfig,
    side: f32,
    gap: f32,
    slot: &ChildSlot,
    count: usize,
    neighbours: impl Iterator<Item = &'a ChildSlot>,
) -> (f32, f32) {
    let span = config.grandchild_span();
    let orbit_for = |radius: f32| {
        let fit = count as f32 * (2.0 * radius + gap) / span;
        let clear = slot.radius + radius + config.safety_margin;
        fit.max(clear)
    };

    // Outer reach (orbit plus grandchild radius) allowed before touching a neighbour:
    // the free space between the two circles, measured from this child's center.
    let cap = neighbours
        .map(|other| {
            let distance = (slot.x - other.x).hypot(slot.y - other.y);
            let clearance = distance - slot.radius - other.radius - config.safety_margin;
            slot.radius + clearance
        })
        .fold(f32::INFINITY, f32::min);

    let original = config.grandchild_radius(side, slot.radius);
    let floor = original * config.min_shrink_ratio.clamp(0.0, 1.0);
    let mut radius = original;
    let mut orbit = orbit_for(radius);

    for _ in 0..config.relaxation_passes {
        let reach = orbit + radius;
        if reach <= cap || radius <= floor {
            break;
        }

        let ratio = (cap / reach).clamp(config.min_shrink_ratio, 1.0);
        radius = (radius * ratio).max(floor);
        orbit = orbit_for(radius);
    }

    if orbit + radius > cap {
        debug!(
            child = slot.id.index(),
            reach = orbit + radius,
            cap,
            "grandchild arc may overlap a neighbouring child"
        );
    }

    (radius, orbit)
}

/// Topmost bubble under the point: the smallest one containing it.
pub fn bubble_at(bubbles: &[PlacedBubble], x: f32, y: f32) -> Option<&PlacedBubble> {
    bubbles
        .iter()
        .filter(|bubble| bubble.contains(x, y))
        .min_by(|a, b| a.radius.total_cmp(&b.radius).then(b.tier.cmp(&a.tier)))
}
