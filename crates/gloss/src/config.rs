/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Resource configuration.
//!
//! A resource file is YAML with kebab-case keys, for example:
//!
//! ```yaml
//! sort: de-CH
//! break-at: word
//! sort-number-pad: 4
//! assign-fields:
//!   - 'short = \FIRSTUC{name} [ short = \NULL ]'
//! ```
//!
//! Strings are converted into typed settings when the configuration is
//! loaded, so that a malformed expression or an unknown sort method is
//! reported before anything is sorted.

use anyhow::{Context, Result, anyhow};
use gloss_entry::{Record, RecordLog};
use gloss_fields::{AssignmentPipeline, FieldAssignment, LabelifyRules, parse_assignments};
use gloss_sort::{
    BreakPoint, Decomposition, GroupFormation, IdenticalSortAction, Locale, Padding,
    RecordCountRule, SortMethod, SortSettings, SortSuffix, Strength,
};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// One resource set, as written in the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ResourceConfig {
    /// Glossary type for entries without a `type` field.
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub sort: Option<String>,
    pub sort_field: Option<String>,
    pub locale: Option<String>,
    pub reverse: bool,
    pub break_at: Option<String>,
    pub break_marker: Option<String>,
    pub sort_number_pad: Option<usize>,
    pub sort_pad_plus: Option<String>,
    pub sort_pad_minus: Option<String>,
    pub sort_suffix: Option<String>,
    pub sort_suffix_marker: Option<String>,
    pub identical_sort_action: Option<String>,
    pub group_formation: Option<String>,
    pub group_level: Option<usize>,
    pub merge_small_groups: Option<usize>,
    pub date_sort_format: Option<String>,
    pub date_sort_group_format: Option<String>,
    pub numeric_sort_pattern: Option<String>,
    pub record_count_rule: Option<String>,
    pub collation_strength: Option<String>,
    pub collation_decomposition: Option<String>,
    pub flatten: bool,
    pub assign_fields: Vec<String>,
    pub assign_override_fields: bool,
    /// Enables record tracking, which `recordcount` needs.
    pub record_count: bool,
    pub records: Vec<Record>,
    pub labelify_replace: Vec<LabelifyReplace>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelifyReplace {
    pub pattern: String,
    pub replacement: String,
}

/// A fully parsed resource configuration.
#[derive(Debug)]
pub struct Resource {
    pub settings: SortSettings,
    pub assignments: AssignmentPipeline,
    pub labelify: LabelifyRules,
    pub records: RecordLog,
    pub record_tracking: bool,
}

/// Read and parse a resource file.
pub fn load_resource(path: &Path) -> Result<Resource> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration {}", path.display()))?;
    let config: ResourceConfig = serde_yaml::from_str(&source)
        .with_context(|| format!("Invalid configuration {}", path.display()))?;
    Resource::from_config(config)
        .with_context(|| format!("Failed to load configuration {}", path.display()))
}

impl Resource {
    pub fn from_config(config: ResourceConfig) -> Result<Self> {
        let settings = config.sort_settings()?;
        let assignments = config.assignment_pipeline()?;
        let labelify = config.labelify_rules()?;
        Ok(Self {
            settings,
            assignments,
            labelify,
            records: config.records.into_iter().collect(),
            record_tracking: config.record_count,
        })
    }
}

impl ResourceConfig {
    pub fn sort_settings(&self) -> Result<SortSettings> {
        let mut settings = SortSettings::default();
        if let Some(method) = &self.sort {
            settings.method = method.parse::<SortMethod>()?;
        }
        if let Some(field) = &self.sort_field {
            settings.sort_field = field.clone();
        }
        if let Some(tag) = &self.locale {
            settings.locale = Locale::parse(tag)?;
        }
        settings.reverse = self.reverse;
        if let Some(break_at) = &self.break_at {
            settings.break_at = break_at.parse::<BreakPoint>()?;
        }
        if let Some(marker) = &self.break_marker {
            settings.break_marker = marker.clone();
        }
        if let Some(width) = self.sort_number_pad.filter(|w| *w > 1) {
            settings.padding = Some(Padding {
                width,
                plus: self.sort_pad_plus.clone(),
                minus: self.sort_pad_minus.clone(),
            });
        }
        if let Some(suffix) = &self.sort_suffix {
            settings.suffix = SortSuffix::parse(suffix);
        }
        if let Some(marker) = &self.sort_suffix_marker {
            settings.suffix_marker = marker.clone();
        }
        if let Some(action) = &self.identical_sort_action {
            settings.identical = IdenticalSortAction::parse(action);
        }
        if let Some(formation) = &self.group_formation {
            settings.group_formation = formation.parse::<GroupFormation>()?;
        }
        if let Some(level) = self.group_level {
            settings.group_level = level;
        }
        settings.merge_small_groups = self.merge_small_groups.filter(|n| *n > 1);
        settings.date_pattern = self.date_sort_format.clone();
        settings.date_group_pattern = self.date_sort_group_format.clone();
        settings.numeric_pattern = self.numeric_sort_pattern.clone();
        if let Some(rule) = &self.record_count_rule {
            settings.record_count_rule = RecordCountRule::parse(rule)?;
        }
        if let Some(strength) = &self.collation_strength {
            settings.strength = strength.parse::<Strength>()?;
        }
        if let Some(decomposition) = &self.collation_decomposition {
            settings.decomposition = decomposition.parse::<Decomposition>()?;
        }
        settings.flatten = self.flatten;
        if let Some(entry_type) = &self.entry_type {
            settings.default_type = entry_type.clone();
        }
        Ok(settings)
    }

    /// Parse every `assign-fields` item, rendering syntax errors with a
    /// source snippet.
    pub fn assignment_pipeline(&self) -> Result<AssignmentPipeline> {
        let mut assignments: Vec<FieldAssignment> = Vec::new();
        for (i, text) in self.assign_fields.iter().enumerate() {
            let parsed = parse_assignments(text).map_err(|err| match err {
                gloss_fields::Error::Syntax(syntax) => {
                    anyhow!(syntax.render(&format!("assign-fields[{}]", i)))
                }
                other => anyhow!(other),
            })?;
            assignments.extend(parsed);
        }
        Ok(AssignmentPipeline::new(assignments).with_override(self.assign_override_fields))
    }

    pub fn labelify_rules(&self) -> Result<LabelifyRules> {
        self.labelify_replace
            .iter()
            .try_fold(LabelifyRules::new(), |rules, replace| {
                let pattern = Regex::new(&replace.pattern).with_context(|| {
                    format!("Invalid labelify-replace pattern '{}'", replace.pattern)
                })?;
                Ok(rules.with_replacement(pattern, replace.replacement.clone()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloss_sort::{CaseStyle, NumericKind};
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str) -> ResourceConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_settings_from_yaml() {
        let config = parse(
            r#"
sort: letter-nocase
sort-field: name
break-at: none
sort-number-pad: 3
sort-pad-minus: "<"
identical-sort-action: original id
group-level: 1
merge-small-groups: 2
"#,
        );
        let settings = config.sort_settings().unwrap();
        assert_eq!(settings.method, SortMethod::Letter(CaseStyle::NoCase));
        assert_eq!(settings.sort_field, "name");
        assert_eq!(settings.break_at, BreakPoint::None);
        assert_eq!(
            settings.padding,
            Some(Padding {
                width: 3,
                plus: None,
                minus: Some("<".to_string()),
            })
        );
        assert_eq!(settings.identical, IdenticalSortAction::OriginalId);
        assert_eq!(settings.group_level, 1);
        assert_eq!(settings.merge_small_groups, Some(2));
    }

    #[test]
    fn test_defaults() {
        let settings = parse("{}").sort_settings().unwrap();
        assert_eq!(settings.method, SortMethod::Locale(None));
        assert_eq!(settings.default_type, "main");
        assert_eq!(settings.padding, None);
    }

    #[test]
    fn test_numeric_method_and_unknown_key() {
        let settings = parse("sort: hex").sort_settings().unwrap();
        assert_eq!(settings.method, SortMethod::Numeric(NumericKind::Hex));
        assert!(serde_yaml::from_str::<ResourceConfig>("sorting: hex").is_err());
    }

    #[test]
    fn test_bad_method_is_an_error() {
        let err = parse("sort: alphabetical").sort_settings().unwrap_err();
        assert_eq!(err.to_string(), "Unknown sort method 'alphabetical'");
    }

    #[test]
    fn test_assignment_syntax_error_is_rendered() {
        let config = parse("assign-fields: ['name = ']");
        let err = config.assignment_pipeline().unwrap_err().to_string();
        assert!(err.contains("assign-fields[0]"), "{}", err);
        assert!(err.contains("Expected a value"), "{}", err);
    }

    #[test]
    fn test_module_example_parses() {
        let config = parse(
            r#"
sort: de-CH
break-at: word
sort-number-pad: 4
assign-fields:
  - 'short = \FIRSTUC{name} [ short = \NULL ]'
"#,
        );
        let resource = Resource::from_config(config).unwrap();
        assert_eq!(resource.assignments.assignments().len(), 1);
        assert_eq!(resource.settings.padding.map(|p| p.width), Some(4));
    }

    #[test]
    fn test_assignments_and_records() {
        let config = parse(
            r#"
assign-fields:
  - 'short = \FIRSTUC{name}, long =+ name'
assign-override-fields: true
record-count: true
records:
  - label: apple
    format: glsnumberformat
"#,
        );
        let resource = Resource::from_config(config).unwrap();
        assert_eq!(resource.assignments.assignments().len(), 2);
        assert!(resource.record_tracking);
        assert_eq!(resource.records.len(), 1);
        assert_eq!(resource.records.first_use("apple"), Some(0));
    }
}
