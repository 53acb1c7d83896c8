use postspin_schema::{Analysis, SourcePost};
use postspin_utils::types::StageId;

use crate::stage::Stage;

const SYSTEM_PROMPT: &str = r#"You analyse high-performing LinkedIn posts and explain why they work.

Read the post several times. Identify its exact structure, the emotional triggers it pulls, and which parts cannot be transferred to another author.

Hook (first line), one of:
- question: opens with an engaging question
- statistic: opens with a striking number
- story: opens a personal story ("Three years ago...")
- controversial: a divisive or counter-intuitive opinion
- how_to: "How to do X in Y steps"
- list_teaser: "5 mistakes that...", "3 reasons to..."

Structure (body), one of: listicle, narrative, tutorial, opinion, case_study, comparison.

Call to action (ending), one of: question, share, comment, link, follow, none.

Universal theme: keep it abstract. Never include names of people, companies, products or services, and never refer to a specific event.
"Our partnership with Microsoft" becomes "Strategic collaboration".
"I launched my podcast X" becomes "Creating educational content".

Company-specific elements: list everything that must NOT be reproduced by someone else: the author's personal experiences, names and references, internal events, specific announcements.

Engagement drivers, any of: personal_story, controversy, actionable_tips, data_backed, emotional_hook, community_question, formatting.

Readability (0-100): short sentences, airy paragraphs and a clear structure score higher; heavy jargon scores lower.

Be thorough. Everything downstream is built on this analysis."#;

/// Breaks the source post into reusable signals and non-reusable specifics.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerStage<'a> {
    pub post: &'a SourcePost,
}

impl Stage for AnalyzerStage<'_> {
    type Output = Analysis;

    fn id(&self) -> StageId {
        StageId::Analyzer
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn instruction(&self) -> String {
        let post = self.post;
        let mut out = format!(
            "Analyse this LinkedIn post in depth.\n\n\
             ORIGINAL POST:\n\"\"\"\n{}\n\"\"\"\n\n\
             METRICS:\n- Likes: {}\n- Comments: {}\n- Shares: {}\n",
            post.content.trim(),
            post.likes,
            post.comments,
            post.shares
        );

        let hints: Vec<String> = [
            ("Category", &post.category),
            ("Hook type", &post.hook_type),
            ("Structure type", &post.structure_type),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| format!("- {label}: {v}")))
        .collect();
        if !hints.is_empty() {
            out.push_str("\nHINTS FROM THE CALLER (verify, do not trust blindly):\n");
            out.push_str(&hints.join("\n"));
            out.push('\n');
        }

        out.push_str(
            "\nGive a COMPLETE analysis: structure, hook, universal theme, what works, \
             and what must NOT be copied.",
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> SourcePost {
        SourcePost {
            content: "5 mistakes that cost me my first startup.\n\n1. Hiring fast...".to_string(),
            author_name: "Dana Ortiz".to_string(),
            likes: 1200,
            comments: 85,
            shares: 40,
            category: Some("entrepreneurship".to_string()),
            hook_type: None,
            structure_type: None,
        }
    }

    #[test]
    fn instruction_includes_content_and_metrics() {
        let post = post();
        let text = AnalyzerStage { post: &post }.instruction();
        assert!(text.contains("5 mistakes that cost me my first startup."));
        assert!(text.contains("- Likes: 1200"));
        assert!(text.contains("- Shares: 40"));
        assert!(text.contains("- Category: entrepreneurship"));
        assert!(!text.contains("Hook type"));
    }

    #[test]
    fn hints_section_is_omitted_without_hints() {
        let mut post = post();
        post.category = None;
        let text = AnalyzerStage { post: &post }.instruction();
        assert!(!text.contains("HINTS"));
    }

    #[test]
    fn system_prompt_lists_every_hook_type() {
        let stage = AnalyzerStage { post: &post() };
        for hook in ["question", "statistic", "story", "controversial", "how_to", "list_teaser"] {
            assert!(stage.system_prompt().contains(hook), "missing {hook}");
        }
    }
}
