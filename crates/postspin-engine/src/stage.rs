//! Stage contract shared by the four pipeline stages.
//!
//! A stage borrows its inputs, describes the role it asks the model to play and renders
//! the instruction for one call. It does not talk to the backend itself; the
//! [`StructuredGenerator`](crate::generator::StructuredGenerator) does that and turns the
//! reply into the stage's validated output type.

use postspin_schema::StageOutput;
use postspin_utils::types::StageId;

pub trait Stage {
    /// Validated value this stage produces.
    type Output: StageOutput;

    fn id(&self) -> StageId;

    /// Role and rules for the model; fixed per stage.
    fn system_prompt(&self) -> &'static str;

    /// Instruction for this particular call, built from the stage inputs.
    fn instruction(&self) -> String;
}

/// Render a list as `- item` lines, or `- (none)` when empty.
pub(crate) fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_list_renders_items_or_placeholder() {
        assert_eq!(bullet_list(&[]), "- (none)");
        assert_eq!(
            bullet_list(&["one".to_string(), "two".to_string()]),
            "- one\n- two"
        );
    }
}
