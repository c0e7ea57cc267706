//! Step nodes and tree traversal.

use super::def::{StepDef, Steps};
use super::label::humanize;
use crate::work::WorkItem;

/// One node in the parsed step tree.
///
/// A node declared as a group derives its state from its descendants; a
/// node with work is a leaf. The depth-first traversal of the tree is both
/// the execution order and the display order, fixed at construction.
#[derive(Debug)]
pub struct StepNode {
    /// Declaration key, unique within siblings.
    pub key: String,

    /// Display label (explicit, or derived from the key).
    pub label: String,

    /// Nesting depth; root nodes are 0.
    pub indent: usize,

    /// Child nodes; empty for leaves.
    pub children: Vec<StepNode>,

    /// Declared as a group, even when it has no children.
    pub group: bool,

    /// The leaf's work item; `None` for groups.
    pub work: Option<WorkItem>,
}

impl StepNode {
    /// Whether this node is a group (derives its state from descendants).
    pub fn is_group(&self) -> bool {
        self.group
    }
}

/// A flattened node, annotated with its depth-first position.
#[derive(Debug)]
pub struct FlatStep {
    pub key: String,
    pub label: String,
    pub indent: usize,
    pub group: bool,
    pub work: Option<WorkItem>,
}

/// Parse a declaration into an ordered tree of step nodes.
pub fn parse(steps: Steps) -> Vec<StepNode> {
    parse_level(steps, 0)
}

fn parse_level(steps: Steps, indent: usize) -> Vec<StepNode> {
    steps
        .into_entries()
        .into_iter()
        .map(|(key, def)| match def {
            StepDef::Work(work) => StepNode {
                label: humanize(&key),
                key,
                indent,
                children: Vec::new(),
                group: false,
                work: Some(work),
            },
            StepDef::Labeled(label, work) => StepNode {
                key,
                label,
                indent,
                children: Vec::new(),
                group: false,
                work: Some(work),
            },
            StepDef::Group(inner) => StepNode {
                label: humanize(&key),
                key,
                indent,
                children: parse_level(inner, indent + 1),
                group: true,
                work: None,
            },
        })
        .collect()
}

/// Flatten a tree depth-first into execution/display order.
pub fn flatten(nodes: Vec<StepNode>) -> Vec<FlatStep> {
    let mut flat = Vec::new();
    flatten_into(nodes, &mut flat);
    flat
}

fn flatten_into(nodes: Vec<StepNode>, flat: &mut Vec<FlatStep>) {
    for node in nodes {
        let group = node.is_group();
        flat.push(FlatStep {
            key: node.key,
            label: node.label,
            indent: node.indent,
            group,
            work: node.work,
        });
        flatten_into(node.children, flat);
    }
}

/// All leaf descendants of a node, in depth-first order.
pub fn leaves_of(node: &StepNode) -> Vec<&StepNode> {
    let mut leaves = Vec::new();
    collect_leaves(node, &mut leaves);
    leaves
}

fn collect_leaves<'a>(node: &'a StepNode, leaves: &mut Vec<&'a StepNode>) {
    if node.is_group() {
        for child in &node.children {
            collect_leaves(child, leaves);
        }
    } else {
        leaves.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn noop() -> WorkItem {
        WorkItem::value(|_| Ok(Value::Null))
    }

    fn sample_tree() -> Vec<StepNode> {
        parse(
            Steps::new()
                .step("loadConfig", noop())
                .group(
                    "build",
                    Steps::new().step("compile", noop()).step("link", noop()),
                )
                .step("deploy", noop()),
        )
    }

    #[test]
    fn parse_derives_labels_from_keys() {
        let nodes = sample_tree();
        assert_eq!(nodes[0].label, "Load config");
        assert_eq!(nodes[1].label, "Build");
    }

    #[test]
    fn parse_keeps_explicit_labels() {
        let nodes = parse(Steps::new().step_labeled("db", "Provision database", noop()));
        assert_eq!(nodes[0].label, "Provision database");
    }

    #[test]
    fn groups_have_children_and_no_work() {
        let nodes = sample_tree();
        assert!(nodes[1].is_group());
        assert!(nodes[1].work.is_none());
        assert_eq!(nodes[1].children.len(), 2);
    }

    #[test]
    fn leaves_have_work_and_no_children() {
        let nodes = sample_tree();
        assert!(!nodes[0].is_group());
        assert!(nodes[0].work.is_some());
    }

    #[test]
    fn indent_tracks_nesting_depth() {
        let nodes = sample_tree();
        assert_eq!(nodes[0].indent, 0);
        assert_eq!(nodes[1].indent, 0);
        assert_eq!(nodes[1].children[0].indent, 1);
    }

    #[test]
    fn flatten_is_depth_first_declaration_order() {
        let flat = flatten(sample_tree());
        let keys: Vec<_> = flat.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["loadConfig", "build", "compile", "link", "deploy"]);
    }

    #[test]
    fn flatten_marks_groups() {
        let flat = flatten(sample_tree());
        let groups: Vec<_> = flat.iter().map(|s| s.group).collect();
        assert_eq!(groups, vec![false, true, false, false, false]);
    }

    #[test]
    fn flatten_preserves_indents() {
        let flat = flatten(sample_tree());
        let indents: Vec<_> = flat.iter().map(|s| s.indent).collect();
        assert_eq!(indents, vec![0, 0, 1, 1, 0]);
    }

    #[test]
    fn leaves_of_returns_all_leaf_descendants() {
        let nodes = parse(Steps::new().group(
            "outer",
            Steps::new()
                .step("a", noop())
                .group("inner", Steps::new().step("b", noop()))
                .step("c", noop()),
        ));
        let leaves = leaves_of(&nodes[0]);
        let keys: Vec<_> = leaves.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_group_is_still_a_group() {
        let nodes = parse(Steps::new().group("empty", Steps::new()));
        assert!(nodes[0].is_group());
        assert!(nodes[0].work.is_none());

        let flat = flatten(nodes);
        assert!(flat[0].group);
    }

    #[test]
    fn leaves_of_a_leaf_is_itself() {
        let nodes = parse(Steps::new().step("solo", noop()));
        let leaves = leaves_of(&nodes[0]);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].key, "solo");
    }

    #[test]
    fn nested_groups_flatten_in_order() {
        let flat = flatten(parse(Steps::new().group(
            "outer",
            Steps::new()
                .step("a", noop())
                .group("inner", Steps::new().step("b", noop())),
        )));
        let keys: Vec<_> = flat.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["outer", "a", "inner", "b"]);
        assert_eq!(flat[3].indent, 2);
    }
}
