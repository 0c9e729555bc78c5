//! Strategies for laying replacement text over the runs of a field result

/// A piece of replacement text and the original run whose formatting it takes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSlice {
    /// Index into the original result runs
    pub source: usize,
    pub text: String,
}

/// Decides how new text is split across the formatting of the old result runs.
///
/// `original` holds the character length of each original result run. An
/// empty `original` means the field had no result runs at all; implementations
/// then return slices with `source` 0 and the caller supplies plain runs.
pub trait FormattingStrategy {
    fn distribute(&self, original: &[usize], new_text: &str) -> Vec<RunSlice>;
}

/// Everything goes into one run formatted like the first original run
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstRunFormatting;

impl FormattingStrategy for FirstRunFormatting {
    fn distribute(&self, _original: &[usize], new_text: &str) -> Vec<RunSlice> {
        vec![RunSlice {
            source: 0,
            text: new_text.to_string(),
        }]
    }
}

/// Keeps the relative split of the original runs.
///
/// Cut points sit at `round(cumulative_len * new_len / original_len)` in
/// characters, so `"Old"`+`"Name"` replaced by `"NewGuy"` becomes `"New"`+`"Guy"`.
/// Slices that end up empty are dropped. With a single run, no original text,
/// or empty new text it behaves like [`FirstRunFormatting`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalFormatting;

impl FormattingStrategy for ProportionalFormatting {
    fn distribute(&self, original: &[usize], new_text: &str) -> Vec<RunSlice> {
        let total: usize = original.iter().sum();
        let chars: Vec<char> = new_text.chars().collect();
        if original.len() < 2 || total == 0 || chars.is_empty() {
            return FirstRunFormatting.distribute(original, new_text);
        }

        let new_len = chars.len();
        let mut slices = Vec::new();
        let mut start = 0usize;
        let mut cumulative = 0usize;

        for (source, len) in original.iter().enumerate() {
            cumulative += len;
            let cut = if source + 1 == original.len() {
                new_len
            } else {
                ((cumulative * new_len) as f64 / total as f64).round() as usize
            };
            let end = cut.clamp(start, new_len);

            if end > start {
                slices.push(RunSlice {
                    source,
                    text: chars[start..end].iter().collect(),
                });
            }
            start = end;
        }

        slices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_proportional_split_keeps_bold_prefix() {
        let slices = ProportionalFormatting.distribute(&[3, 4], "NewGuy");
        assert_eq!(
            slices,
            vec![
                RunSlice { source: 0, text: "New".into() },
                RunSlice { source: 1, text: "Guy".into() },
            ]
        );
    }

    #[test]
    fn test_proportional_longer_text() {
        let slices = ProportionalFormatting.distribute(&[2, 2], "abcdefgh");
        assert_eq!(slices[0].text, "abcd");
        assert_eq!(slices[1].text, "efgh");
    }

    #[test]
    fn test_proportional_drops_empty_slices() {
        let slices = ProportionalFormatting.distribute(&[1, 0, 9], "ab");
        assert_eq!(slices.iter().map(|s| s.source).collect::<Vec<_>>(), vec![2]);
        assert_eq!(slices[0].text, "ab");
    }

    #[test]
    fn test_single_run_falls_back_to_first() {
        let slices = ProportionalFormatting.distribute(&[5], "whatever");
        assert_eq!(slices, FirstRunFormatting.distribute(&[5], "whatever"));
    }

    #[test]
    fn test_empty_original_falls_back_to_first() {
        let slices = ProportionalFormatting.distribute(&[0, 0], "x");
        assert_eq!(slices, vec![RunSlice { source: 0, text: "x".into() }]);
    }

    proptest! {
        #[test]
        fn prop_slices_reassemble_text(
            lens in proptest::collection::vec(0usize..20, 0..6),
            text in "\\PC{0,40}",
        ) {
            let slices = ProportionalFormatting.distribute(&lens, &text);
            let joined: String = slices.iter().map(|s| s.text.as_str()).collect();
            prop_assert_eq!(joined, text);
            for pair in slices.windows(2) {
                prop_assert!(pair[0].source < pair[1].source);
            }
        }
    }
}
