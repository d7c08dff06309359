/// A raw spreadsheet cell value as handed over by an ingestion source.
///
/// `Number(f64::NAN)` is how empty cells surface from numeric columns in
/// spreadsheet readers; the normalizer folds it into absence.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
}

/// Normalize one raw cell into a clean string, or `None` for anything that
/// means "no value": null cells, NaN sentinels, and whitespace-only text.
///
/// Total and deterministic. Integral floats render without a fractional
/// tail (`42`, not `42.0`).
pub fn normalize(value: &RawValue) -> Option<String> {
    let text = match value {
        RawValue::Null => return None,
        RawValue::Number(n) if n.is_nan() => return None,
        RawValue::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        RawValue::Int(i) => i.to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Text(s) => s.clone(),
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
