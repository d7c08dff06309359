use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// The closed set of semantic attributes a field-definition record is
/// normalized to. Every member must have an entry in the header alias table
/// (`crate::schema::aliases`); the two are extended together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    FieldName,
    Description,
    FieldType,
    Format,
    FieldLength,
    DefaultValue,
    ValidValues,
    FieldBehaviour,
    VisibilityRules,
    VisibilityAttributes,
}

impl CanonicalField {
    /// All canonical fields, in wire-output order.
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::FieldName,
        CanonicalField::Description,
        CanonicalField::FieldType,
        CanonicalField::Format,
        CanonicalField::FieldLength,
        CanonicalField::DefaultValue,
        CanonicalField::ValidValues,
        CanonicalField::FieldBehaviour,
        CanonicalField::VisibilityRules,
        CanonicalField::VisibilityAttributes,
    ];

    /// camelCase key used on the wire.
    pub fn as_camel(&self) -> &'static str {
        match self {
            CanonicalField::FieldName => "fieldName",
            CanonicalField::Description => "description",
            CanonicalField::FieldType => "fieldType",
            CanonicalField::Format => "format",
            CanonicalField::FieldLength => "fieldLength",
            CanonicalField::DefaultValue => "defaultValue",
            CanonicalField::ValidValues => "validValues",
            CanonicalField::FieldBehaviour => "fieldBehaviour",
            CanonicalField::VisibilityRules => "visibilityRules",
            CanonicalField::VisibilityAttributes => "visibilityAttributes",
        }
    }

    /// snake_case name used as the storage column and index field name.
    pub fn as_snake(&self) -> &'static str {
        match self {
            CanonicalField::FieldName => "field_name",
            CanonicalField::Description => "description",
            CanonicalField::FieldType => "field_type",
            CanonicalField::Format => "format",
            CanonicalField::FieldLength => "field_length",
            CanonicalField::DefaultValue => "default_value",
            CanonicalField::ValidValues => "valid_values",
            CanonicalField::FieldBehaviour => "field_behaviour",
            CanonicalField::VisibilityRules => "visibility_rules",
            CanonicalField::VisibilityAttributes => "visibility_attributes",
        }
    }
}

/// One canonical field-definition record: the ten canonical values (absent
/// when the source file had no such column or the cell was empty) plus the
/// originating file and 1-based spreadsheet row.
///
/// Immutable once built; absent values serialize as `""`, never `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRecord {
    pub field_name: Option<String>,
    pub description: Option<String>,
    pub field_type: Option<String>,
    pub format: Option<String>,
    pub field_length: Option<String>,
    pub default_value: Option<String>,
    pub valid_values: Option<String>,
    pub field_behaviour: Option<String>,
    pub visibility_rules: Option<String>,
    pub visibility_attributes: Option<String>,
    pub source_file: String,
    pub row_number: u32,
}

impl FieldRecord {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::FieldName => self.field_name.as_deref(),
            CanonicalField::Description => self.description.as_deref(),
            CanonicalField::FieldType => self.field_type.as_deref(),
            CanonicalField::Format => self.format.as_deref(),
            CanonicalField::FieldLength => self.field_length.as_deref(),
            CanonicalField::DefaultValue => self.default_value.as_deref(),
            CanonicalField::ValidValues => self.valid_values.as_deref(),
            CanonicalField::FieldBehaviour => self.field_behaviour.as_deref(),
            CanonicalField::VisibilityRules => self.visibility_rules.as_deref(),
            CanonicalField::VisibilityAttributes => self.visibility_attributes.as_deref(),
        }
    }

    pub fn set(&mut self, field: CanonicalField, value: Option<String>) {
        let slot = match field {
            CanonicalField::FieldName => &mut self.field_name,
            CanonicalField::Description => &mut self.description,
            CanonicalField::FieldType => &mut self.field_type,
            CanonicalField::Format => &mut self.format,
            CanonicalField::FieldLength => &mut self.field_length,
            CanonicalField::DefaultValue => &mut self.default_value,
            CanonicalField::ValidValues => &mut self.valid_values,
            CanonicalField::FieldBehaviour => &mut self.field_behaviour,
            CanonicalField::VisibilityRules => &mut self.visibility_rules,
            CanonicalField::VisibilityAttributes => &mut self.visibility_attributes,
        };
        *slot = value;
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FieldRecord", 12)?;
        for field in CanonicalField::ALL {
            s.serialize_field(field.as_camel(), self.get(field).unwrap_or(""))?;
        }
        s.serialize_field("sourceFile", &self.source_file)?;
        s.serialize_field("rowNumber", &self.row_number)?;
        s.end()
    }
}

/// A multi-criteria partial-match query. Terms are stored trimmed and
/// non-empty; `set_term` with a blank string is a no-op removal, so an
/// all-blank request degrades to the match-everything query.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    file_name: Option<String>,
    terms: Vec<(CanonicalField, String)>,
}

impl SearchQuery {
    pub fn set_file(&mut self, name: &str) {
        let trimmed = name.trim();
        self.file_name = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn set_term(&mut self, field: CanonicalField, term: &str) {
        let trimmed = term.trim();
        self.terms.retain(|(f, _)| *f != field);
        if !trimmed.is_empty() {
            self.terms.push((field, trimmed.to_string()));
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn terms(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.terms.iter().map(|(f, t)| (*f, t.as_str()))
    }

    /// True when neither a file filter nor any field term is set. Such a
    /// query matches every record.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none() && self.terms.is_empty()
    }
}

/// Wire shape of a search request as JSON consumers author it. All keys
/// optional; blank strings behave the same as omitted keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub file_name: Option<String>,
    pub field_name: Option<String>,
    pub description: Option<String>,
    pub field_type: Option<String>,
    pub format: Option<String>,
    pub field_length: Option<String>,
    pub default_value: Option<String>,
    pub valid_values: Option<String>,
    pub field_behaviour: Option<String>,
    pub visibility_rules: Option<String>,
    pub visibility_attributes: Option<String>,
}

impl SearchRequest {
    pub fn into_query(self) -> SearchQuery {
        let mut query = SearchQuery::default();
        if let Some(file) = &self.file_name {
            query.set_file(file);
        }
        let pairs = [
            (CanonicalField::FieldName, self.field_name),
            (CanonicalField::Description, self.description),
            (CanonicalField::FieldType, self.field_type),
            (CanonicalField::Format, self.format),
            (CanonicalField::FieldLength, self.field_length),
            (CanonicalField::DefaultValue, self.default_value),
            (CanonicalField::ValidValues, self.valid_values),
            (CanonicalField::FieldBehaviour, self.field_behaviour),
            (CanonicalField::VisibilityRules, self.visibility_rules),
            (CanonicalField::VisibilityAttributes, self.visibility_attributes),
        ];
        for (field, term) in pairs {
            if let Some(term) = term {
                query.set_term(field, &term);
            }
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_serialize_as_empty_strings() {
        let record = FieldRecord {
            field_name: Some("CustomerID".into()),
            source_file: "a.xlsx".into(),
            row_number: 2,
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fieldName"], "CustomerID");
        assert_eq!(json["fieldType"], "");
        assert_eq!(json["visibilityAttributes"], "");
        assert_eq!(json["sourceFile"], "a.xlsx");
        assert_eq!(json["rowNumber"], 2);
    }

    #[test]
    fn blank_terms_are_omitted_not_stored() {
        let mut query = SearchQuery::default();
        query.set_term(CanonicalField::FieldType, "   ");
        query.set_file("");
        assert!(query.is_empty());

        query.set_term(CanonicalField::FieldType, "  int  ");
        let terms: Vec<_> = query.terms().collect();
        assert_eq!(terms, vec![(CanonicalField::FieldType, "int")]);
    }

    #[test]
    fn set_term_replaces_previous_value_for_field() {
        let mut query = SearchQuery::default();
        query.set_term(CanonicalField::FieldName, "customer");
        query.set_term(CanonicalField::FieldName, "order");
        let terms: Vec<_> = query.terms().collect();
        assert_eq!(terms, vec![(CanonicalField::FieldName, "order")]);
        query.set_term(CanonicalField::FieldName, "");
        assert!(query.is_empty());
    }

    #[test]
    fn request_body_maps_to_query() {
        let body = r#"{"fileName":"a","fieldType":"int","visibilityRules":" hidden "}"#;
        let request: SearchRequest = serde_json::from_str(body).unwrap();
        let query = request.into_query();
        assert_eq!(query.file_name(), Some("a"));
        let terms: Vec<_> = query.terms().collect();
        assert_eq!(
            terms,
            vec![
                (CanonicalField::FieldType, "int"),
                (CanonicalField::VisibilityRules, "hidden"),
            ]
        );
    }
}
