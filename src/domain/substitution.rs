//! Preview name derivation through ordered literal find/replace rules

/// Delimiter used when rule lists are stored or passed as a single string
pub const RULE_DELIMITER: char = ';';

/// Suffix stripped from a preview file name to build its caption
const PREVIEW_SUFFIX: &str = ".preview.png";

/// Caption shown when no preview file exists at the resolved path
pub const NO_PREVIEW_CAPTION: &str = "No Preview Available";

/// Ordered (pattern, replacement) pairs.
///
/// Rules are applied one after another, each on the output of the previous
/// one, so a later rule can match text introduced by an earlier rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionRules {
    rules: Vec<(String, String)>,
}

impl SubstitutionRules {
    /// Pairs patterns with replacements by position; surplus entries of the longer list are dropped
    pub fn from_lists<P, R>(patterns: P, replacements: R) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let rules = patterns
            .into_iter()
            .zip(replacements)
            .map(|(p, r)| (p.into(), r.into()))
            .collect();
        Self { rules }
    }

    /// Parses two `;`-delimited strings, trimming every item
    pub fn parse(text_to_replace: &str, replace_with: &str) -> Self {
        Self::from_lists(split_list(text_to_replace), split_list(replace_with))
    }

    /// Derives the preview name for `image_name`
    pub fn resolve(&self, image_name: &str) -> String {
        let mut name = image_name.to_string();
        for (pattern, replacement) in &self.rules {
            if pattern.is_empty() {
                continue;
            }
            name = name.replace(pattern.as_str(), replacement);
        }
        name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

}

/// Splits a delimited list, trimming each item. An empty or blank input yields no items.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(RULE_DELIMITER)
        .map(|item| item.trim().to_string())
        .collect()
}

/// Joins list items back into their stored form
pub fn join_list(items: &[String]) -> String {
    items.join(&RULE_DELIMITER.to_string())
}

/// Caption for a found preview: its file name without the `.preview.png` suffix
pub fn preview_caption(preview_name: &str) -> String {
    preview_name.replace(PREVIEW_SUFFIX, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_applies_rules_in_sequence() {
        let first = SubstitutionRules::from_lists(["_source"], [""]);
        assert_eq!(first.resolve("imagea_source.png"), "imagea.png");

        let both = SubstitutionRules::from_lists(["_source", "pic"], ["", "img"]);
        assert_eq!(both.resolve("pic_source.png"), "img.png");
    }

    #[test]
    fn test_resolve_single_letter_rule_hits_whole_name() {
        // "a" also matches inside "image"
        let rules = SubstitutionRules::from_lists(["_source", "a"], ["", "b"]);
        assert_eq!(rules.resolve("imagea_source.png"), "imbgeb.png");
    }

    #[test]
    fn test_resolve_later_rule_sees_earlier_output() {
        // Rule 1 introduces "xx" which rule 2 then rewrites
        let rules = SubstitutionRules::from_lists(["img", "xx"], ["xx", "preview"]);
        assert_eq!(rules.resolve("img_01.png"), "preview_01.png");
    }

    #[test]
    fn test_resolve_replaces_every_occurrence() {
        let rules = SubstitutionRules::from_lists(["a"], ["o"]);
        assert_eq!(rules.resolve("banana.png"), "bonono.png");
    }

    #[test]
    fn test_resolve_is_literal() {
        let rules = SubstitutionRules::from_lists([".*"], ["X"]);
        assert_eq!(rules.resolve("a.png"), "a.png");
        assert_eq!(rules.resolve("a.*.png"), "aX.png");
    }

    #[test]
    fn test_resolve_no_match_is_noop() {
        let rules = SubstitutionRules::from_lists(["zzz"], ["y"]);
        assert_eq!(rules.resolve("photo.png"), "photo.png");
    }

    #[test]
    fn test_resolve_skips_empty_pattern() {
        let rules = SubstitutionRules::from_lists([""], ["x"]);
        assert_eq!(rules.resolve("ab.png"), "ab.png");
    }

    #[test]
    fn test_from_lists_drops_surplus() {
        let rules = SubstitutionRules::from_lists(["a", "b", "c"], ["1"]);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.resolve("abc"), "1bc");

        let rules = SubstitutionRules::from_lists(["a"], ["1", "2", "3"]);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_parse_trims_items() {
        let rules = SubstitutionRules::parse(" _source ; .png", "; .preview.png");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.resolve("cat_source.png"), "cat.preview.png");
    }

    #[test]
    fn test_parse_empty_strings() {
        let rules = SubstitutionRules::parse("", "");
        assert!(rules.is_empty());
        assert_eq!(rules.resolve("a.png"), "a.png");
    }

    #[test]
    fn test_split_and_join_list() {
        assert_eq!(split_list("a; b ;c"), vec!["a", "b", "c"]);
        assert!(split_list("   ").is_empty());
        assert_eq!(join_list(&["a".to_string(), "b".to_string()]), "a;b");
    }

    #[test]
    fn test_preview_caption() {
        assert_eq!(preview_caption("cat.preview.png"), "cat");
        assert_eq!(preview_caption("cat.png"), "cat.png");
    }
}
