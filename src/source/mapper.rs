//! Row to target mapping shared by every source kind.

use std::collections::BTreeMap;

use crate::config::ColumnMapping;
use crate::source::Target;

/// Map one parsed row to a target.
///
/// Rows too short to hold the target column yield `None`. Labels whose column
/// is out of range are left out; when none qualify the target has no label
/// set at all.
pub fn map_row<S: AsRef<str>>(row: &[S], mapping: &ColumnMapping) -> Option<Target> {
    let address = row.get(mapping.target_col)?.as_ref().to_string();

    let labels: BTreeMap<String, String> = mapping
        .labels
        .iter()
        .filter_map(|label| {
            row.get(label.col)
                .map(|value| (label.label_name.clone(), value.as_ref().to_string()))
        })
        .collect();

    Some(Target {
        targets: vec![address],
        labels: (!labels.is_empty()).then_some(labels),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelColumn;

    fn mapping(target_col: usize, labels: &[(usize, &str)]) -> ColumnMapping {
        ColumnMapping {
            target_col,
            labels: labels
                .iter()
                .map(|(col, name)| LabelColumn {
                    col: *col,
                    label_name: name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_address_and_labels() {
        let m = mapping(0, &[(1, "env"), (2, "dc")]);
        let target = map_row(&["host1:9100", "prod", "fra"], &m).unwrap();
        assert_eq!(target.targets, vec!["host1:9100"]);
        let labels = target.labels.unwrap();
        assert_eq!(labels["env"], "prod");
        assert_eq!(labels["dc"], "fra");
    }

    #[test]
    fn test_short_row_skipped() {
        let m = mapping(2, &[]);
        assert!(map_row(&["a", "b"], &m).is_none());
        assert!(map_row::<&str>(&[], &m).is_none());
        assert!(map_row(&["a", "b", "c"], &m).is_some());
    }

    #[test]
    fn test_out_of_range_label_excluded() {
        let m = mapping(0, &[(1, "env"), (5, "rack")]);
        let target = map_row(&["host", "dev"], &m).unwrap();
        let labels = target.labels.unwrap();
        assert_eq!(labels.len(), 1);
        assert!(!labels.contains_key("rack"));
    }

    #[test]
    fn test_no_qualifying_labels_means_no_label_set() {
        let m = mapping(0, &[(1, "env")]);
        let target = map_row(&["host2"], &m).unwrap();
        assert!(target.labels.is_none());
        assert_eq!(serde_json::to_string(&target).unwrap(), r#"{"targets":["host2"]}"#);
    }

    #[test]
    fn test_target_column_can_be_a_label_too() {
        let m = mapping(1, &[(1, "instance"), (0, "name")]);
        let target = map_row(&["web", "10.0.0.1"], &m).unwrap();
        assert_eq!(target.targets, vec!["10.0.0.1"]);
        assert_eq!(target.labels.unwrap()["instance"], "10.0.0.1");
    }

    #[test]
    fn test_empty_cells_are_kept() {
        let m = mapping(0, &[(1, "env")]);
        let target = map_row(&["", ""], &m).unwrap();
        assert_eq!(target.targets, vec![""]);
        assert_eq!(target.labels.unwrap()["env"], "");
    }
}
