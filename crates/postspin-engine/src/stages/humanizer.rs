use postspin_schema::Revision;
use postspin_utils::types::StageId;

use crate::orchestrator::DraftState;
use crate::stage::{Stage, bullet_list};

const SYSTEM_PROMPT: &str = r#"You are an editor who specialises in making text sound human.

You take a post that still has AI patterns and REWRITE it so it sounds 100% human.

What gives AI text away:
1. Structures that are too perfect: paragraphs of equal length, sentences that start the same way, lists that are too symmetric. Break the symmetry.
2. Generic expressions: "In a world where..." (delete it, start differently), "It is essential to..." (be direct: "Do X"), "In conclusion..." (delete it, end naturally), "Don't hesitate to..." (make the invitation natural).
3. A tone that is too smooth: everything positive (add nuance), no personality (inject a voice), too polite (be more direct).
4. Lack of specifics: "many people" (give a number or an example), "often" (give context), "really" (delete the filler).

Techniques:
- Break the rhythm. "First idea. Second idea. Third idea." becomes "First idea. Then there's this surprising thing. The second? Subtler."
- Add lived experience. "People say X matters." becomes "I learned that the hard way two years ago."
- Be imperfect on purpose: a fragment ("The result? Unexpected."), an aside ("(yes, even I was surprised)"), an admission ("I was wrong.").
- Ask natural questions. "What do you think?" becomes "Ever realised this too late?"

Set ready_to_publish to true only when no AI pattern remains, the authenticity score reaches the target, and the post is engaging and unique."#;

/// One humanization pass over the current draft.
#[derive(Debug, Clone, Copy)]
pub struct HumanizerStage<'a> {
    pub draft: &'a DraftState,
    pub min_authenticity: f64,
}

impl Stage for HumanizerStage<'_> {
    type Output = Revision;

    fn id(&self) -> StageId {
        StageId::Humanizer
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn instruction(&self) -> String {
        format!(
            "Humanise this LinkedIn post and remove EVERY AI pattern.\n\n\
             CURRENT POST:\n\"\"\"\n{content}\n\"\"\"\n\n\
             AI PATTERNS DETECTED:\n{patterns}\n\n\
             WEAKNESSES IDENTIFIED:\n{weaknesses}\n\n\
             GOAL:\n\
             - Authenticity score >= {target}\n\
             - No AI pattern left\n\
             - The post must pass the test \"would a person actually say this?\"\n\n\
             Rewrite the post so it is 100% human.",
            content = self.draft.content.trim(),
            patterns = bullet_list(&self.draft.ai_patterns),
            weaknesses = bullet_list(&self.draft.weaknesses),
            target = self.min_authenticity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postspin_schema::Draft;

    #[test]
    fn instruction_carries_content_patterns_and_target() {
        let draft = DraftState::from_draft(
            &Draft {
                draft_content: "In a world where speed matters...".to_string(),
                hashtags: vec![],
                authenticity_score: 60.0,
                originality_score: 80.0,
                predicted_engagement: 50.0,
                strengths: vec![],
                weaknesses: vec!["generic opener".to_string()],
                ai_patterns_detected: vec!["In a world where".to_string()],
                needs_revision: true,
            },
            1,
        );
        let text = HumanizerStage {
            draft: &draft,
            min_authenticity: 85.0,
        }
        .instruction();
        assert!(text.contains("\"\"\"\nIn a world where speed matters...\n\"\"\""));
        assert!(text.contains("AI PATTERNS DETECTED:\n- In a world where"));
        assert!(text.contains("WEAKNESSES IDENTIFIED:\n- generic opener"));
        assert!(text.contains("- Authenticity score >= 85"));
    }
}
