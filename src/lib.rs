pub mod demo;
pub mod error;
pub mod focus;
pub mod pack;
pub mod records;
pub mod tree;
pub mod util;

pub use error::{BuildError, BuildResult};
pub use focus::FocusState;
pub use pack::{PackConfig, PlacedBubble, Tier, bubble_at, pack, pack_with};
pub use records::{FlatRecord, load_records, parse_records};
pub use tree::{BubbleTree, NodeId, TreeNode, build};
