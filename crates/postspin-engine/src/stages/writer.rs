use postspin_schema::{Analysis, Angle, CompanyProfile, Draft, SpinOptions, Tone};
use postspin_utils::types::StageId;

use crate::stage::Stage;

const SYSTEM_PROMPT: &str = r#"You are a senior LinkedIn copywriter. You write like a PERSON, not like an AI.

You receive a universal theme, the chosen creative angle, a company profile and the requested tone (professional, casual or inspirational). Write an ORIGINAL post that treats the theme from that angle, sounds fully human, engages the reader and represents the company well.

Banned AI patterns, zero tolerance:
- "In a world where..."
- "In the era of..."
- "It is undeniable that..."
- "It goes without saying..."
- "Indeed," or "Moreover," opening a sentence
- "In conclusion..." or "Ultimately..." as a closer
- "More than just a..."
- "Beyond..."
- "It is worth noting..."
- bullet lists with identical emojis
- overly symmetric structure, every sentence starting the same way
- stacked adverbs (truly, absolutely, incredibly) and empty superlatives (revolutionary, exceptional, unique)

What makes a post human: natural imperfection without mistakes, sentences of varied length, a PERSONAL point of view, specific details instead of generalities, plain talk instead of corporate jargon, real experience or reflection, humility where it fits, sincere questions rather than rhetorical ones.

Format:
- First line: catchy and unexpected, no formula
- Body: airy, one idea per block, varied rhythm (short-long-short)
- Ending: a specific, personal invitation to talk; never a generic "What about you?"
- Hashtags: 3 to 5 relevant ones, never generic

Length: 800 to 1500 characters.

Before answering, check yourself: could a reader tell an AI wrote this? Would I say this out loud? Are there repetitive patterns? Does the post bring real value?
If you detect AI patterns, set needs_revision to true. The authenticity score must exceed 80 to be acceptable.
Never reuse names, companies, products or events from the original post."#;

/// Writes the first full draft for the selected angle.
#[derive(Debug, Clone, Copy)]
pub struct WriterStage<'a> {
    pub analysis: &'a Analysis,
    pub angle: &'a Angle,
    pub profile: &'a CompanyProfile,
    pub options: &'a SpinOptions,
    /// Tone after the configured default has been applied.
    pub tone: Tone,
}

impl Stage for WriterStage<'_> {
    type Output = Draft;

    fn id(&self) -> StageId {
        StageId::Writer
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn instruction(&self) -> String {
        let cta_rule = if self.options.include_cta {
            "End with a natural call to action"
        } else {
            "No call to action"
        };
        format!(
            "Write an ORIGINAL, HUMAN LinkedIn post.\n\n\
             THEME: {theme}\n\
             CORE MESSAGE: {message}\n\n\
             CHOSEN ANGLE: {name}\n\
             - Description: {description}\n\
             - Differentiation: {differentiation}\n\
             - Hook idea: {hook}\n\n\
             COMPANY PROFILE:\n\
             - Name: {company}\n\
             - Industry: {industry}\n\
             - Requested tone: {tone}\n\
             - Key messages: {messages}\n\n\
             NON-NEGOTIABLE RULES:\n\
             - NO AI PATTERNS\n\
             - Sound 100% HUMAN\n\
             - Vary sentence length\n\
             - Personal point of view\n\
             - {cta_rule}\n\n\
             Write the post now.",
            theme = self.analysis.universal_theme,
            message = self.analysis.core_message,
            name = self.angle.angle_name,
            description = self.angle.angle_description,
            differentiation = self.angle.differentiation,
            hook = self.angle.hook_idea,
            company = self.profile.company_name,
            industry = self.profile.industry,
            tone = self.tone,
            messages = self.profile.key_messages.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postspin_schema::{CtaType, HookType, StructureType};

    fn fixtures() -> (Analysis, Angle, CompanyProfile) {
        let analysis = Analysis {
            hook_type: HookType::Story,
            hook_text: "Three years ago I almost quit.".to_string(),
            structure_type: StructureType::Narrative,
            cta_type: CtaType::None,
            universal_theme: "Persistence through doubt".to_string(),
            core_message: "Doubt is data, not a verdict".to_string(),
            emotional_trigger: "hope".to_string(),
            engagement_drivers: vec![],
            readability_score: 70.0,
            success_factors: vec![],
            company_specific_elements: vec![],
            adaptability_score: 80.0,
            adaptation_challenges: vec![],
        };
        let angle = Angle {
            angle_name: "The spreadsheet that lied".to_string(),
            angle_description: "A finance lens on doubt".to_string(),
            differentiation: "Data-led instead of story-led".to_string(),
            hook_idea: "Our best quarter looked like our worst.".to_string(),
            relevance_to_company: 90.0,
            originality_score: 85.0,
        };
        let profile = CompanyProfile {
            company_name: "Northwind Capital".to_string(),
            industry: "finance".to_string(),
            tone_of_voice: vec![],
            key_messages: vec!["Clarity beats complexity".to_string(), "Long horizons".to_string()],
            values: vec![],
            target_audience: None,
            differentiators: None,
        };
        (analysis, angle, profile)
    }

    #[test]
    fn instruction_uses_angle_tone_and_cta_flag() {
        let (analysis, angle, profile) = fixtures();
        let options = SpinOptions::default();
        let text = WriterStage {
            analysis: &analysis,
            angle: &angle,
            profile: &profile,
            options: &options,
            tone: Tone::Casual,
        }
        .instruction();
        assert!(text.contains("CHOSEN ANGLE: The spreadsheet that lied"));
        assert!(text.contains("- Requested tone: casual"));
        assert!(text.contains("- Key messages: Clarity beats complexity, Long horizons"));
        assert!(text.contains("End with a natural call to action"));
    }

    #[test]
    fn cta_can_be_disabled() {
        let (analysis, angle, profile) = fixtures();
        let options = SpinOptions {
            include_cta: false,
            ..SpinOptions::default()
        };
        let text = WriterStage {
            analysis: &analysis,
            angle: &angle,
            profile: &profile,
            options: &options,
            tone: Tone::Professional,
        }
        .instruction();
        assert!(text.contains("No call to action"));
        assert!(!text.contains("natural call to action"));
    }
}
