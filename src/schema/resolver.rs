use std::collections::HashMap;

use crate::model::types::CanonicalField;
use crate::schema::aliases::aliases_for;

/// Normalize a header for comparison: lower-case, spaces and underscores
/// stripped. `"Field Name"`, `"field_name"`, and `"FieldName"` all collapse
/// to `"fieldname"`.
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// The mapping from canonical field to the raw header that supplies it in
/// one particular file's header set. Built once per file, then applied to
/// every row of that file.
///
/// A field with no matching alias is simply absent; that is the normal
/// "this file does not carry this column" outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSchema {
    resolved: HashMap<CanonicalField, String>,
}

impl ResolvedSchema {
    /// Resolve `raw_headers` (in file order) against the alias table.
    ///
    /// For each canonical field the alias list is tried in declared order and
    /// the first raw header whose normalized form matches wins, preserving
    /// the raw spelling for later cell lookup. When two raw headers
    /// normalize identically, the earlier one in the header row wins.
    pub fn resolve(raw_headers: &[String]) -> Self {
        let mut by_normalized: HashMap<String, &str> = HashMap::new();
        for header in raw_headers {
            by_normalized
                .entry(normalize_header(header))
                .or_insert(header.as_str());
        }

        let mut resolved = HashMap::new();
        for field in CanonicalField::ALL {
            for alias in aliases_for(field) {
                if let Some(raw) = by_normalized.get(&normalize_header(alias)) {
                    resolved.insert(field, (*raw).to_string());
                    break;
                }
            }
        }
        Self { resolved }
    }

    /// The raw header supplying `field` in this file, if any.
    pub fn raw_header(&self, field: CanonicalField) -> Option<&str> {
        self.resolved.get(&field).map(String::as_str)
    }

    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        self.resolved.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalization_collapses_case_spaces_and_underscores() {
        assert_eq!(normalize_header("Field Name"), "fieldname");
        assert_eq!(normalize_header("field_name"), "fieldname");
        assert_eq!(normalize_header("FIELD NAME"), "fieldname");
        assert_eq!(normalize_header("FieldName"), "fieldname");
    }

    #[test]
    fn full_header_set_resolves_every_field() {
        let raw = headers(&[
            "Field Name",
            "Description",
            "Field Type",
            "Format",
            "Field Length",
            "Default Value",
            "Valid Values",
            "Field Behaviour",
            "Visibility Rules",
            "Visibility Attributes",
        ]);
        let schema = ResolvedSchema::resolve(&raw);
        for field in CanonicalField::ALL {
            assert!(schema.is_resolved(field), "{:?} unresolved", field);
        }
        assert_eq!(schema.len(), 10);
    }

    #[test]
    fn alias_order_decides_between_competing_headers() {
        // "Field Type" is declared before "Type"; when both columns are
        // present the declared-first alias supplies the value.
        let schema = ResolvedSchema::resolve(&headers(&["Type", "Field Type"]));
        assert_eq!(
            schema.raw_header(CanonicalField::FieldType),
            Some("Field Type")
        );

        // With only the lower-priority spelling present, it is chosen.
        let schema = ResolvedSchema::resolve(&headers(&["Field Name", "Type"]));
        assert_eq!(schema.raw_header(CanonicalField::FieldType), Some("Type"));
        assert_eq!(
            schema.raw_header(CanonicalField::FieldName),
            Some("Field Name")
        );
    }

    #[test]
    fn missing_aliases_leave_field_unresolved() {
        let schema = ResolvedSchema::resolve(&headers(&["Field Name", "Unrelated"]));
        assert!(schema.is_resolved(CanonicalField::FieldName));
        assert!(!schema.is_resolved(CanonicalField::Description));
        assert!(!schema.is_resolved(CanonicalField::VisibilityRules));
    }

    #[test]
    fn duplicate_normalized_headers_pick_first_occurrence() {
        let schema = ResolvedSchema::resolve(&headers(&["field_name", "Field Name"]));
        assert_eq!(
            schema.raw_header(CanonicalField::FieldName),
            Some("field_name")
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let raw = headers(&["Field Name", "Type", "Rules"]);
        assert_eq!(ResolvedSchema::resolve(&raw), ResolvedSchema::resolve(&raw));
    }

    #[test]
    fn raw_spelling_is_preserved_for_lookup() {
        let schema = ResolvedSchema::resolve(&headers(&["FIELD_NAME"]));
        assert_eq!(
            schema.raw_header(CanonicalField::FieldName),
            Some("FIELD_NAME")
        );
    }
}
