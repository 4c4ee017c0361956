use anyhow::Result;

use crate::records::{FlatRecord, parse_records};

const DEMO_JSON: &str = include_str!("../data/demo.json");

pub const DEMO_LABEL: &str = "built-in demo";

pub fn demo_records() -> Result<Vec<FlatRecord>> {
    parse_records(DEMO_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build;

    #[test]
    fn demo_dataset_builds() {
        let records = demo_records().unwrap();
        let tree = build(&records).unwrap();

        assert_eq!(tree.len(), records.len());
        let top = tree
            .children(tree.root())
            .iter()
            .map(|id| tree.node(*id).name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(top, vec!["Kusama", "Basquiat", "Hokusai", "Pilgrimage"]);
        assert_eq!(tree.orphans(), &[tree.find("Pilgrimage").unwrap()]);
    }
}
