//! In-memory [`TemplateAccumulator`] that can be rendered as a CloudFormation document.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::contract::{ResourceFragment, TemplateAccumulator};
use crate::naming::to_resource_name;

pub const RESOURCES: &str = "resources";
pub const OUTPUTS: &str = "outputs";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TemplateSections {
    sections: BTreeMap<String, Map<String, Value>>,
}

impl TemplateSections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: &str, name: &str) -> Option<&ResourceFragment> {
        self.sections.get(section).and_then(|entries| entries.get(name))
    }

    /// Entries of a section; empty when nothing was appended to it.
    pub fn section(&self, section: &str) -> impl Iterator<Item = (&String, &Value)> {
        self.sections.get(section).into_iter().flatten()
    }

    pub fn len(&self, section: &str) -> usize {
        self.sections.get(section).map_or(0, Map::len)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(Map::is_empty)
    }

    /// Render as `{"Resources": {...}, "Outputs": {...}}`.
    pub fn to_cloudformation(&self) -> Value {
        let document: Map<String, Value> = self
            .sections
            .iter()
            .map(|(section, entries)| (to_resource_name(section), Value::Object(entries.clone())))
            .collect();
        Value::Object(document)
    }
}

impl TemplateAccumulator for TemplateSections {
    fn append(&mut self, section: &str, name: &str, fragment: ResourceFragment) {
        let entries = self.sections.entry(section.to_string()).or_default();
        if entries.insert(name.to_string(), fragment).is_some() {
            debug!(section, name, "Replaced existing template entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_write_wins_per_section_and_name() {
        let mut template = TemplateSections::new();
        template.append(RESOURCES, "Job", json!(1));
        template.append(OUTPUTS, "Job", json!("out"));
        template.append(RESOURCES, "Job", json!(2));

        assert_eq!(template.len(RESOURCES), 1);
        assert_eq!(template.get(RESOURCES, "Job"), Some(&json!(2)));
        assert_eq!(template.get(OUTPUTS, "Job"), Some(&json!("out")));
    }

    #[test]
    fn renders_cloudformation_sections() {
        let mut template = TemplateSections::new();
        template.append(RESOURCES, "Etl1", json!({ "Type": "AWS::Glue::Job" }));
        assert_eq!(
            template.to_cloudformation(),
            json!({ "Resources": { "Etl1": { "Type": "AWS::Glue::Job" } } })
        );
    }
}
