use crate::pack::{PlacedBubble, Tier};
use crate::tree::{BubbleTree, NodeId};

/// Navigation state for the bubble view. Transitions are pure: each returns the next
/// state and leaves `self` untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusState {
    pub focus: NodeId,
    pub overlay: Option<NodeId>,
    pub overlay_open: bool,
}

impl Default for FocusState {
    fn default() -> Self {
        Self {
            focus: NodeId::ROOT,
            overlay: None,
            overlay_open: false,
        }
    }
}

impl FocusState {
    pub fn root_view(tree: &BubbleTree) -> Self {
        Self {
            focus: tree.root(),
            ..Self::default()
        }
    }

    pub fn is_root_view(&self) -> bool {
        self.focus.is_root()
    }

    /// Only a direct child of the current focus that has children of its own can
    /// become the new focus.
    pub fn drill_down(self, tree: &BubbleTree, target: NodeId) -> Self {
        let is_child = tree.parent(target) == Some(self.focus);
        if !is_child || !tree.has_children(target) {
            return self;
        }

        Self {
            focus: target,
            overlay: None,
            overlay_open: false,
        }
    }

    pub fn drill_up(self, tree: &BubbleTree) -> Self {
        let focus = tree.parent(self.focus).unwrap_or_else(|| tree.root());
        Self {
            focus,
            overlay: None,
            overlay_open: false,
        }
    }

    /// Jumps straight to `target`, e.g. from a search result. Leaves are shown in
    /// their parent's view with the overlay open on them.
    pub fn focus_on(self, tree: &BubbleTree, target: NodeId) -> Self {
        if tree.get(target).is_none() {
            return self;
        }

        if tree.has_children(target) || target.is_root() {
            return Self {
                focus: target,
                overlay: None,
                overlay_open: false,
            };
        }

        Self {
            focus: tree.parent(target).unwrap_or_else(|| tree.root()),
            ..self
        }
        .open_overlay(target)
    }

    pub fn open_overlay(self, target: NodeId) -> Self {
        Self {
            overlay: Some(target),
            overlay_open: true,
            ..self
        }
    }

    pub fn close_overlay(self) -> Self {
        Self {
            overlay_open: false,
            ..self
        }
    }

    pub fn overlay_node(&self) -> Option<NodeId> {
        self.overlay.filter(|_| self.overlay_open)
    }

    /// Maps this state from `from` onto a rebuilt `to` by lineage id. A focus that
    /// no longer exists falls back to its nearest surviving ancestor; an overlay that
    /// no longer exists is dropped.
    pub fn carry_over(self, from: &BubbleTree, to: &BubbleTree) -> Self {
        let lookup = |id: NodeId| from.get(id).and_then(|node| to.find_lineage(&node.lineage_id));

        let focus = std::iter::once(self.focus)
            .chain(from.ancestors(self.focus))
            .find_map(lookup)
            .unwrap_or_else(|| to.root());

        match self.overlay.and_then(lookup) {
            Some(overlay) => Self {
                focus,
                overlay: Some(overlay),
                overlay_open: self.overlay_open,
            },
            None => Self {
                focus,
                overlay: None,
                overlay_open: false,
            },
        }
    }

    pub fn on_bubble_click(self, tree: &BubbleTree, bubble: &PlacedBubble) -> Self {
        match bubble.tier {
            Tier::Focus => self.drill_up(tree),
            Tier::Child if tree.has_children(bubble.node) => self.drill_down(tree, bubble.node),
            Tier::Child | Tier::Grandchild => self.open_overlay(bubble.node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FlatRecord;
    use crate::tree::build;

    fn sample() -> BubbleTree {
        build(&[
            FlatRecord::new("Kusama", 1),
            FlatRecord::new("Bio", 2).with_parent("Kusama"),
            FlatRecord::new("Art", 2).with_parent("Kusama"),
            FlatRecord::new("Style", 3).with_parent("Art"),
            FlatRecord::new("Dots", 4).with_parent("Style"),
        ])
        .unwrap()
    }

    #[test]
    fn drill_down_requires_child_with_children() {
        let tree = sample();
        let kusama = tree.find("Kusama").unwrap();
        let bio = tree.find("Bio").unwrap();
        let art = tree.find("Art").unwrap();
        let style = tree.find("Style").unwrap();

        let state = FocusState::root_view(&tree).drill_down(&tree, kusama);
        assert_eq!(state.focus, kusama);

        assert_eq!(state.drill_down(&tree, bio), state);
        assert_eq!(state.drill_down(&tree, style), state);
        assert_eq!(state.drill_down(&tree, art).focus, art);
    }

    #[test]
    fn drill_up_stops_at_root() {
        let tree = sample();
        let art = tree.find("Art").unwrap();
        let state = FocusState::root_view(&tree).focus_on(&tree, art);

        let up = state.drill_up(&tree);
        assert_eq!(up.focus, tree.find("Kusama").unwrap());
        let top = up.drill_up(&tree);
        assert!(top.is_root_view());
        assert!(top.drill_up(&tree).is_root_view());
    }

    #[test]
    fn focus_on_leaf_opens_overlay_in_parent_view() {
        let tree = sample();
        let bio = tree.find("Bio").unwrap();

        let state = FocusState::root_view(&tree).focus_on(&tree, bio);
        assert_eq!(state.focus, tree.find("Kusama").unwrap());
        assert_eq!(state.overlay_node(), Some(bio));

        let closed = state.close_overlay();
        assert_eq!(closed.overlay_node(), None);
        assert_eq!(closed.overlay, Some(bio));
    }

    #[test]
    fn carry_over_keeps_focus_and_overlay_by_lineage() {
        let before = sample();
        let art = before.find("Art").unwrap();
        let style = before.find("Style").unwrap();
        let state = FocusState::root_view(&before)
            .focus_on(&before, art)
            .open_overlay(style);

        let after = build(&[
            FlatRecord::new("Extra", 1),
            FlatRecord::new("Style", 3).with_parent("Art"),
            FlatRecord::new("Art", 2).with_parent("Kusama"),
            FlatRecord::new("Kusama", 1),
        ])
        .unwrap();

        let carried = state.carry_over(&before, &after);
        assert_eq!(carried.focus, after.find("Art").unwrap());
        assert_eq!(carried.overlay_node(), after.find("Style"));
    }

    #[test]
    fn carry_over_falls_back_to_surviving_ancestor() {
        let before = sample();
        let style = before.find("Style").unwrap();
        let bio = before.find("Bio").unwrap();
        let state = FocusState::root_view(&before)
            .focus_on(&before, style)
            .open_overlay(bio);

        let after = build(&[
            FlatRecord::new("Kusama", 1),
            FlatRecord::new("Art", 2).with_parent("Kusama"),
        ])
        .unwrap();

        let carried = state.carry_over(&before, &after);
        assert_eq!(carried.focus, after.find("Art").unwrap());
        assert_eq!(carried.overlay, None);
        assert!(!carried.overlay_open);

        let empty = build(&[]).unwrap();
        assert!(state.carry_over(&before, &empty).is_root_view());
    }

    #[test]
    fn bubble_clicks_dispatch_by_tier() {
        let tree = sample();
        let kusama = tree.find("Kusama").unwrap();
        let state = FocusState::root_view(&tree).focus_on(&tree, kusama);
        let bubbles = crate::pack::pack(&tree, kusama, 600.0);
        let by_name = |name: &str| bubbles.iter().find(|bubble| bubble.name == name).unwrap();

        let into_art = state.on_bubble_click(&tree, by_name("Art"));
        assert_eq!(into_art.focus, tree.find("Art").unwrap());

        let bio_overlay = state.on_bubble_click(&tree, by_name("Bio"));
        assert_eq!(bio_overlay.focus, kusama);
        assert_eq!(bio_overlay.overlay_node(), tree.find("Bio"));

        let style_overlay = state.on_bubble_click(&tree, by_name("Style"));
        assert_eq!(style_overlay.overlay_node(), tree.find("Style"));

        let up = state.on_bubble_click(&tree, by_name("Kusama"));
        assert!(up.is_root_view());
    }
}
