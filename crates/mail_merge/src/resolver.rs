//! Field value resolver
//!
//! Turns a scanned field plus the caller's values into the text the patcher
//! writes. Resolution never touches the tree.

use crate::date::{format_date, parse_date_value, DateContext, LONG_DATE_PICTURE};
use crate::error::MergeWarning;
use crate::field::{FieldCode, FieldOccurrence};
use crate::switches::SwitchSet;
use crate::values::FieldValues;

/// Text to write into a field result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub text: String,
    /// `\* MERGEFORMAT` was present; keep the per-run formatting of the result
    pub preserve_formatting: bool,
}

/// Why a field keeps its cached result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// Left alone with a warning for the caller
    Warned(MergeWarning),
    /// A DATE field with neither a `DATE` value nor a date context
    NoDate,
}

impl Unresolved {
    pub fn into_warning(self) -> Option<MergeWarning> {
        match self {
            Unresolved::Warned(warning) => Some(warning),
            Unresolved::NoDate => None,
        }
    }
}

/// Resolve one field occurrence
pub fn resolve(
    occurrence: &FieldOccurrence,
    values: &FieldValues,
    date: &DateContext<'_>,
) -> Result<Replacement, Unresolved> {
    let switches = SwitchSet::parse(occurrence.code, &occurrence.switches).map_err(|invalid| {
        Unresolved::Warned(MergeWarning::InvalidSwitch {
            field: occurrence.name.clone(),
            switch: invalid.switch,
            reason: invalid.reason,
        })
    })?;

    let text = match occurrence.code {
        FieldCode::MergeField => resolve_merge_field(occurrence, values, date, &switches)?,
        FieldCode::Date => resolve_date(values, date, &switches)?,
    };

    Ok(Replacement {
        text,
        preserve_formatting: switches.preserve_formatting(),
    })
}

fn resolve_merge_field(
    occurrence: &FieldOccurrence,
    values: &FieldValues,
    date: &DateContext<'_>,
    switches: &SwitchSet,
) -> Result<String, Unresolved> {
    let raw = values.get(&occurrence.name).ok_or_else(|| {
        Unresolved::Warned(MergeWarning::MissingFieldValue {
            field: occurrence.name.clone(),
        })
    })?;

    let value = match (switches.date_picture(), parse_date_value(raw)) {
        (Some(picture), Some(when)) => {
            format_date(when, picture, date.locale).unwrap_or_else(|| raw.to_string())
        }
        _ => raw.to_string(),
    };

    Ok(switches.surround(switches.apply_case(&value)))
}

fn resolve_date(
    values: &FieldValues,
    date: &DateContext<'_>,
    switches: &SwitchSet,
) -> Result<String, Unresolved> {
    if let Some(value) = values.date_override() {
        return Ok(value.to_string());
    }
    let now = date.now.ok_or(Unresolved::NoDate)?;
    let picture = date
        .picture
        .or_else(|| switches.date_picture())
        .unwrap_or(LONG_DATE_PICTURE);

    let text = format_date(now, picture, date.locale).ok_or(Unresolved::NoDate)?;
    Ok(switches.apply_case(&text))
}
