//! Pulling a JSON object out of free-form model text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::validation::StageOutput;

/// Body of the first fenced code block, if any.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)```").expect("fence pattern is valid")
});

/// Locate the JSON object in a model response.
///
/// Models wrap JSON in prose or code fences. A fenced block is preferred; otherwise the
/// first balanced `{ ... }` in the text that parses as JSON is returned, so stray braces
/// in the prose before the object are skipped. Braces inside string literals are
/// ignored while balancing.
#[must_use]
pub fn extract_json_object(raw: &str) -> Option<&str> {
    if let Some(body) = FENCED_BLOCK.captures(raw).and_then(|c| c.get(1))
        && let Some(object) = first_json_object(body.as_str())
    {
        return Some(object);
    }
    first_json_object(raw)
}

fn first_json_object(text: &str) -> Option<&str> {
    text.match_indices('{')
        .filter_map(|(start, _)| balanced_object(&text[start..]))
        .find(|candidate| serde_json::from_str::<serde_json::Value>(candidate).is_ok())
}

/// The balanced object starting at the first byte of `text`, which must be `{`.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract, deserialize and validate a stage output from raw model text.
///
/// # Errors
///
/// Returns the list of schema issues: no JSON found, a deserialization error, or the
/// domain rules reported by [`StageOutput::validate`].
pub fn parse_stage_output<T: StageOutput>(raw: &str) -> Result<T, Vec<String>> {
    let json = extract_json_object(raw)
        .ok_or_else(|| vec!["response contains no JSON object".to_string()])?;
    let mut output: T = serde_json::from_str(json).map_err(|e| vec![e.to_string()])?;
    output.validate()?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Revision;

    #[test]
    fn plain_object_is_returned_whole() {
        let raw = r#"{"a": {"b": 1}}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn prose_around_object_is_stripped() {
        let raw = "Sure! Here it is:\n{\"a\": 1}\nLet me know.";
        assert_eq!(extract_json_object(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn fenced_block_wins_over_earlier_braces() {
        let raw = "Use {curly} carefully.\n```json\n{\"a\": \"}\"}\n```";
        assert_eq!(extract_json_object(raw), Some("{\"a\": \"}\"}"));
    }

    #[test]
    fn braces_in_strings_do_not_unbalance() {
        let raw = r#"{"text": "a { b \" } c", "n": 2} trailing"#;
        assert_eq!(
            extract_json_object(raw),
            Some(r#"{"text": "a { b \" } c", "n": 2}"#)
        );
    }

    #[test]
    fn braces_in_prose_before_the_object_are_skipped() {
        let raw = r#"I kept the {tone} you asked for: {"revised_content": "x", "n": {"m": 1}}"#;
        assert_eq!(
            extract_json_object(raw),
            Some(r#"{"revised_content": "x", "n": {"m": 1}}"#)
        );
    }

    #[test]
    fn revision_after_braced_prose_parses() {
        let raw = "Kept the {tone}: {\"revised_content\": \"Ship it.\", \
                   \"final_authenticity_score\": 88, \"final_originality_score\": 75, \
                   \"ready_to_publish\": true}";
        let revision = parse_stage_output::<Revision>(raw).unwrap();
        assert_eq!(revision.revised_content, "Ship it.");
        assert!(revision.ready_to_publish);
    }

    #[test]
    fn unterminated_object_yields_none() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn parse_reports_each_failure_mode() {
        let none = parse_stage_output::<Revision>("I could not do it").unwrap_err();
        assert_eq!(none, vec!["response contains no JSON object"]);

        let bad_type =
            parse_stage_output::<Revision>(r#"{"revised_content": 3}"#).unwrap_err();
        assert_eq!(bad_type.len(), 1);

        let out_of_range = parse_stage_output::<Revision>(
            r#"{"revised_content": "x", "final_authenticity_score": 120,
                "final_originality_score": 80, "ready_to_publish": true}"#,
        )
        .unwrap_err();
        assert!(out_of_range[0].starts_with("final_authenticity_score"));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn object_survives_surrounding_prose(
                before in "[A-Za-z .,!?]{0,40}",
                after in "[A-Za-z .,!?]{0,40}",
                key in "[a-z]{1,10}",
                value in "[A-Za-z {}\\[\\]]{0,20}",
            ) {
                let object = serde_json::json!({ key: value }).to_string();
                let raw = format!("{before}{object}{after}");
                prop_assert_eq!(extract_json_object(&raw), Some(object.as_str()));
            }
        }
    }
}
