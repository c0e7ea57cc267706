//! Step declarations.
//!
//! [`Steps`] is the nested key→value mapping the engine consumes: each entry
//! is a work item, a `(label, work item)` pair when the display label should
//! not be derived from the key, or a nested [`Steps`] mapping (a group).
//! Entry order is preserved and becomes execution order.

use crate::work::WorkItem;

/// One entry in a step declaration.
#[derive(Debug)]
pub enum StepDef {
    /// A leaf; label derived from the key.
    Work(WorkItem),

    /// A leaf with an explicit display label.
    Labeled(String, WorkItem),

    /// A nested group of steps.
    Group(Steps),
}

/// An ordered step declaration.
///
/// # Example
///
/// ```
/// use cairn::{Steps, WorkItem};
/// use serde_json::json;
///
/// let steps = Steps::new()
///     .step("loadConfig", WorkItem::value(|_| Ok(json!("loaded"))))
///     .group(
///         "build",
///         Steps::new()
///             .step("compile", WorkItem::value(|_| Ok(json!(true))))
///             .step_labeled("link", "Link objects", WorkItem::value(|_| Ok(json!(true)))),
///     );
/// assert_eq!(steps.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Steps {
    entries: Vec<(String, StepDef)>,
}

impl Steps {
    /// Create an empty declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf step. The display label is derived from the key.
    pub fn step(mut self, key: impl Into<String>, work: WorkItem) -> Self {
        self.entries.push((key.into(), StepDef::Work(work)));
        self
    }

    /// Append a leaf step with an explicit display label.
    pub fn step_labeled(
        mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        work: WorkItem,
    ) -> Self {
        self.entries
            .push((key.into(), StepDef::Labeled(label.into(), work)));
        self
    }

    /// Append a group of nested steps.
    pub fn group(mut self, key: impl Into<String>, steps: Steps) -> Self {
        self.entries.push((key.into(), StepDef::Group(steps)));
        self
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the declaration is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, StepDef)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn entries_preserve_declaration_order() {
        let steps = Steps::new()
            .step("first", WorkItem::value(|_| Ok(Value::Null)))
            .step("second", WorkItem::value(|_| Ok(Value::Null)))
            .step("third", WorkItem::value(|_| Ok(Value::Null)));

        let keys: Vec<_> = steps
            .into_entries()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_declaration() {
        let steps = Steps::new();
        assert!(steps.is_empty());
        assert_eq!(steps.len(), 0);
    }

    #[test]
    fn group_nests_steps() {
        let steps = Steps::new().group(
            "outer",
            Steps::new().step("inner", WorkItem::value(|_| Ok(Value::Null))),
        );
        let entries = steps.into_entries();
        assert_eq!(entries.len(), 1);
        match &entries[0].1 {
            StepDef::Group(inner) => assert_eq!(inner.len(), 1),
            _ => panic!("expected a group"),
        }
    }

    #[test]
    fn labeled_step_keeps_explicit_label() {
        let steps = Steps::new().step_labeled(
            "db",
            "Provision database",
            WorkItem::value(|_| Ok(Value::Null)),
        );
        match &steps.into_entries()[0].1 {
            StepDef::Labeled(label, _) => assert_eq!(label, "Provision database"),
            _ => panic!("expected a labeled step"),
        }
    }
}
