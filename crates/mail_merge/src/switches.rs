//! Field switch parsing
//!
//! Switch tokens come from [`FieldInstruction::switches`](crate::FieldInstruction)
//! and are interpreted here, per field code.

use crate::field::FieldCode;

/// General formatting argument of a `\*` switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralFormat {
    /// Keep the per-run formatting of the existing result
    MergeFormat,
    /// Take the formatting of the first result run
    CharFormat,
    Upper,
    Lower,
    FirstCap,
    Caps,
}

impl GeneralFormat {
    fn from_arg(arg: &str) -> Option<Self> {
        let format = match arg.to_ascii_lowercase().as_str() {
            "mergeformat" => Self::MergeFormat,
            "charformat" => Self::CharFormat,
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            "firstcap" => Self::FirstCap,
            "caps" => Self::Caps,
            _ => return None,
        };
        Some(format)
    }

    fn apply(&self, text: &str) -> String {
        match self {
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::FirstCap => capitalize(text),
            Self::Caps => text
                .split(' ')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            Self::MergeFormat | Self::CharFormat => text.to_string(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A recognized switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Switch {
    /// `\* arg`
    Format(GeneralFormat),
    /// `\@ "picture"`
    DatePicture(String),
    /// `\# "picture"`; accepted and passed through
    NumericPicture(String),
    /// MERGEFIELD `\b "text"`
    TextBefore(String),
    /// MERGEFIELD `\f "text"`
    TextAfter(String),
    /// Argument-less switch with no effect on the result (`\m`, `\v`, `\l`)
    Flag(char),
}

/// A switch token that could not be interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSwitch {
    pub switch: String,
    pub reason: String,
}

/// The interpreted switches of one field, in instruction order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchSet {
    switches: Vec<Switch>,
}

impl SwitchSet {
    /// Interpret the switch tokens of a field
    pub fn parse(code: FieldCode, tokens: &[String]) -> Result<Self, InvalidSwitch> {
        let mut switches = Vec::new();
        let mut iter = tokens.iter().peekable();

        while let Some(token) = iter.next() {
            let Some(body) = token.strip_prefix('\\') else {
                return Err(InvalidSwitch {
                    switch: token.clone(),
                    reason: "expected a switch".to_string(),
                });
            };
            let mut chars = body.chars();
            let Some(letter) = chars.next() else {
                return Err(InvalidSwitch {
                    switch: token.clone(),
                    reason: "empty switch".to_string(),
                });
            };
            let glued = chars.as_str();
            let letter = letter.to_ascii_lowercase();

            let takes_argument = matches!(letter, '*' | '@' | '#')
                || (code == FieldCode::MergeField && matches!(letter, 'b' | 'f'));
            let argument = if !takes_argument {
                None
            } else if !glued.is_empty() {
                Some(glued.to_string())
            } else if iter.peek().is_some_and(|next| !looks_like_switch(next)) {
                iter.next().cloned()
            } else {
                return Err(InvalidSwitch {
                    switch: token.clone(),
                    reason: "missing argument".to_string(),
                });
            };

            let switch = match (code, letter, argument) {
                (_, '*', Some(arg)) => match GeneralFormat::from_arg(&arg) {
                    Some(format) => Switch::Format(format),
                    None => {
                        return Err(InvalidSwitch {
                            switch: format!("{} {}", token, arg),
                            reason: "unknown format".to_string(),
                        })
                    }
                },
                (_, '@', Some(arg)) => Switch::DatePicture(arg),
                (_, '#', Some(arg)) => Switch::NumericPicture(arg),
                (FieldCode::MergeField, 'b', Some(arg)) => Switch::TextBefore(arg),
                (FieldCode::MergeField, 'f', Some(arg)) => Switch::TextAfter(arg),
                (FieldCode::MergeField, 'm' | 'v', None) if glued.is_empty() => Switch::Flag(letter),
                (FieldCode::Date, 'l', None) if glued.is_empty() => Switch::Flag(letter),
                _ => {
                    return Err(InvalidSwitch {
                        switch: token.clone(),
                        reason: format!("not supported on {}", code.as_str()),
                    })
                }
            };
            switches.push(switch);
        }

        Ok(Self { switches })
    }

    /// Whether `\* MERGEFORMAT` is present
    pub fn preserve_formatting(&self) -> bool {
        self.switches
            .iter()
            .any(|s| *s == Switch::Format(GeneralFormat::MergeFormat))
    }

    /// The last date-time picture; later pictures override earlier ones
    pub fn date_picture(&self) -> Option<&str> {
        self.switches.iter().rev().find_map(|s| match s {
            Switch::DatePicture(p) => Some(p.as_str()),
            _ => None,
        })
    }

    /// Apply the text-case formats in instruction order
    pub fn apply_case(&self, text: &str) -> String {
        self.switches.iter().fold(text.to_string(), |acc, s| match s {
            Switch::Format(format) => format.apply(&acc),
            _ => acc,
        })
    }

    /// Wrap a non-empty value with the `\b` and `\f` texts
    pub fn surround(&self, value: String) -> String {
        if value.is_empty() {
            return value;
        }
        let before: String = self
            .switches
            .iter()
            .filter_map(|s| match s {
                Switch::TextBefore(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        let after: String = self
            .switches
            .iter()
            .filter_map(|s| match s {
                Switch::TextAfter(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        format!("{}{}{}", before, value, after)
    }
}

fn looks_like_switch(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('\\')
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '*' | '@' | '#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mergeformat_detected() {
        let set = SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\*", "MERGEFORMAT"])).unwrap();
        assert!(set.preserve_formatting());
        let set = SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\*", "CHARFORMAT"])).unwrap();
        assert!(!set.preserve_formatting());
    }

    #[test]
    fn test_glued_format_argument() {
        let set = SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\*MERGEFORMAT"])).unwrap();
        assert!(set.preserve_formatting());
    }

    #[test]
    fn test_last_date_picture_wins() {
        let set = SwitchSet::parse(
            FieldCode::Date,
            &tokens(&["\\@", "d MMM", "\\@", "yyyy"]),
        )
        .unwrap();
        assert_eq!(set.date_picture(), Some("yyyy"));
    }

    #[test]
    fn test_case_formats() {
        let set = SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\*", "Upper"])).unwrap();
        assert_eq!(set.apply_case("bill gates"), "BILL GATES");
        let set = SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\*", "Caps"])).unwrap();
        assert_eq!(set.apply_case("bill gates"), "Bill Gates");
        let set = SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\*", "FirstCap"])).unwrap();
        assert_eq!(set.apply_case("bill gates"), "Bill gates");
    }

    #[test]
    fn test_surround_only_non_empty() {
        let set = SwitchSet::parse(
            FieldCode::MergeField,
            &tokens(&["\\b", "Dear ", "\\f", ","]),
        )
        .unwrap();
        assert_eq!(set.surround("Bill".to_string()), "Dear Bill,");
        assert_eq!(set.surround(String::new()), "");
    }

    #[test]
    fn test_missing_argument_is_invalid() {
        let err = SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\@"])).unwrap_err();
        assert_eq!(err.reason, "missing argument");
        let err = SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\b", "\\f", "x"])).unwrap_err();
        assert_eq!(err.switch, "\\b");
    }

    #[test]
    fn test_unknown_switches_are_invalid() {
        assert!(SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\z"])).is_err());
        assert!(SwitchSet::parse(FieldCode::Date, &tokens(&["\\h"])).is_err());
        assert!(SwitchSet::parse(FieldCode::Date, &tokens(&["\\b", "x"])).is_err());
        assert!(SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\*", "Roman"])).is_err());
        assert!(SwitchSet::parse(FieldCode::MergeField, &tokens(&["stray"])).is_err());
    }

    #[test]
    fn test_flags_accepted() {
        assert!(SwitchSet::parse(FieldCode::MergeField, &tokens(&["\\m", "\\v"])).is_ok());
        assert!(SwitchSet::parse(FieldCode::Date, &tokens(&["\\l"])).is_ok());
    }
}
