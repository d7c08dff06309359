use crate::model::types::CanonicalField;

/// Accepted raw header spellings per canonical field, in match-priority
/// order. Comparison happens on normalized text (see
/// [`crate::schema::resolver::normalize_header`]), so entries here differ
/// only where their normalized forms differ.
///
/// No alias may normalize to the same string under two different canonical
/// fields; declaration order resolves any future overlap (first entry wins).
const ALIASES: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::FieldName, &["Field Name", "FieldName", "Name"]),
    (CanonicalField::Description, &["Description"]),
    (
        CanonicalField::FieldType,
        &["Field Type", "FieldType", "Type", "DataType"],
    ),
    (CanonicalField::Format, &["Format"]),
    (
        CanonicalField::FieldLength,
        &["Field Length", "FieldLength", "Length"],
    ),
    (
        CanonicalField::DefaultValue,
        &["Default Value", "DefaultValue", "Default"],
    ),
    (
        CanonicalField::ValidValues,
        &["Valid Values", "Valid Value(s)", "ValidValues"],
    ),
    (
        CanonicalField::FieldBehaviour,
        &[
            "Field Behaviour",
            "Field Behavior",
            "FieldBehaviour",
            "Behavior",
            "Behaviour",
        ],
    ),
    (
        CanonicalField::VisibilityRules,
        &["Visibility Rules", "VisibilityRules", "Rules"],
    ),
    (
        CanonicalField::VisibilityAttributes,
        &["Visibility Attributes", "VisibilityAttributes", "Attributes"],
    ),
];

/// Accepted raw header spellings for `field`, in declared priority order.
pub fn aliases_for(field: CanonicalField) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::resolver::normalize_header;
    use std::collections::HashMap;

    #[test]
    fn every_canonical_field_has_at_least_one_alias() {
        for field in CanonicalField::ALL {
            assert!(
                !aliases_for(field).is_empty(),
                "{:?} missing from alias table",
                field
            );
        }
    }

    #[test]
    fn every_field_has_a_human_readable_alias() {
        // At least one spelling per field must be a natural header: either a
        // spaced phrase or a single capitalized word.
        for field in CanonicalField::ALL {
            assert!(
                aliases_for(field)
                    .iter()
                    .any(|a| a.contains(' ') || a.chars().filter(|c| c.is_uppercase()).count() == 1),
                "{:?} has no natural-form alias",
                field
            );
        }
    }

    #[test]
    fn no_normalized_alias_is_claimed_by_two_fields() {
        let mut seen: HashMap<String, CanonicalField> = HashMap::new();
        for field in CanonicalField::ALL {
            for alias in aliases_for(field) {
                let norm = normalize_header(alias);
                if let Some(owner) = seen.get(&norm) {
                    assert_eq!(
                        *owner, field,
                        "alias {alias:?} claimed by both {owner:?} and {field:?}"
                    );
                } else {
                    seen.insert(norm, field);
                }
            }
        }
    }
}
