use postspin_schema::{Analysis, AngleSet, CompanyProfile};
use postspin_utils::types::StageId;

use crate::stage::Stage;

const SYSTEM_PROMPT: &str = r#"You are a creative content strategist. You propose COMPLETELY DIFFERENT angles on the same theme.

You receive the analysis of a post that performed well (theme, structure, what works) and the profile of a company (industry, tone, values, audience).

Propose 3 to 5 original angles that:
1. Cover the SAME universal theme
2. Are TOTALLY different from the original approach
3. Fit the company profile
4. Have strong engagement potential

An angle is original when it uses a different structure (listicle becomes narrative), takes a different point of view (positive becomes challenge), targets a different emotion, or brings a perspective only this company has.

Angle families to draw from: personal experience, surprising data, counter-intuitive take, practical guide, provocative question, anonymised customer case, before/after retrospective, prediction.

Score every angle on two independent axes:
- relevance_to_company: does it fit the industry and values?
- originality_score: is it really different from the original post?

Recommend the angle with the best balance of originality, relevance and likely engagement. Give its zero-based position in the list as recommended_angle_index.

Be bold. No safe options. Never mention people, companies or products from the original post."#;

/// Proposes alternative treatments of the analysed theme and recommends one.
#[derive(Debug, Clone, Copy)]
pub struct AngleStage<'a> {
    pub analysis: &'a Analysis,
    pub profile: &'a CompanyProfile,
    pub preference: Option<&'a str>,
}

impl Stage for AngleStage<'_> {
    type Output = AngleSet;

    fn id(&self) -> StageId {
        StageId::AngleGenerator
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn instruction(&self) -> String {
        let analysis = self.analysis;
        let profile = self.profile;

        let mut out = format!(
            "Generate ORIGINAL angles for this theme.\n\n\
             ANALYSIS OF THE ORIGINAL POST:\n\
             - Universal theme: {}\n\
             - Core message: {}\n\
             - Original hook: {}\n\
             - Original structure: {}\n\
             - Engagement drivers: {}\n\n\
             COMPANY PROFILE:\n\
             - Name: {}\n\
             - Industry: {}\n\
             - Tone: {}\n\
             - Key messages: {}\n\
             - Values: {}\n",
            analysis.universal_theme,
            analysis.core_message,
            analysis.hook_type,
            analysis.structure_type,
            analysis.engagement_drivers.join(", "),
            profile.company_name,
            profile.industry,
            profile.tone_of_voice.join(", "),
            profile.key_messages.join(", "),
            profile.values.join(", "),
        );
        if let Some(differentiators) = profile.differentiators.as_deref()
            && !differentiators.is_empty()
        {
            out.push_str(&format!("- Differentiators: {}\n", differentiators.join(", ")));
        }
        if let Some(audience) = &profile.target_audience {
            if !audience.roles.is_empty() {
                out.push_str(&format!("- Audience roles: {}\n", audience.roles.join(", ")));
            }
            if !audience.industries.is_empty() {
                out.push_str(&format!(
                    "- Audience industries: {}\n",
                    audience.industries.join(", ")
                ));
            }
        }

        out.push_str(
            "\nCONSTRAINTS:\n\
             - The angle must DIFFER from the original (not the same structure, not the same hook)\n\
             - It must fit the company profile\n\
             - It must have strong engagement potential\n",
        );
        if let Some(preference) = self.preference {
            out.push_str(&format!("\nPREFERENCE: {preference}\n"));
        }
        out.push_str("\nGenerate 3 to 5 bold, original angles.");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postspin_schema::{CtaType, HookType, StructureType, TargetAudience};

    fn analysis() -> Analysis {
        Analysis {
            hook_type: HookType::ListTeaser,
            hook_text: "5 mistakes that cost me my first startup".to_string(),
            structure_type: StructureType::Listicle,
            cta_type: CtaType::Question,
            universal_theme: "Learning from early failure".to_string(),
            core_message: "Mistakes compound unless you name them".to_string(),
            emotional_trigger: "vulnerability".to_string(),
            engagement_drivers: vec!["personal_story".to_string(), "actionable_tips".to_string()],
            readability_score: 82.0,
            success_factors: vec![],
            company_specific_elements: vec!["Acme seed round".to_string()],
            adaptability_score: 75.0,
            adaptation_challenges: vec![],
        }
    }

    fn profile() -> CompanyProfile {
        CompanyProfile {
            company_name: "Northwind Capital".to_string(),
            industry: "finance".to_string(),
            tone_of_voice: vec!["professional".to_string()],
            key_messages: vec!["Clarity beats complexity".to_string()],
            values: vec!["transparency".to_string()],
            target_audience: Some(TargetAudience {
                roles: vec!["CFO".to_string()],
                industries: vec![],
            }),
            differentiators: None,
        }
    }

    #[test]
    fn instruction_carries_theme_and_company() {
        let analysis = analysis();
        let profile = profile();
        let text = AngleStage {
            analysis: &analysis,
            profile: &profile,
            preference: None,
        }
        .instruction();
        assert!(text.contains("- Universal theme: Learning from early failure"));
        assert!(text.contains("- Original hook: list_teaser"));
        assert!(text.contains("- Engagement drivers: personal_story, actionable_tips"));
        assert!(text.contains("- Industry: finance"));
        assert!(text.contains("- Audience roles: CFO"));
        assert!(!text.contains("Audience industries"));
        assert!(!text.contains("Differentiators"));
        assert!(!text.contains("PREFERENCE"));
    }

    #[test]
    fn preference_is_appended_when_given() {
        let analysis = analysis();
        let profile = profile();
        let text = AngleStage {
            analysis: &analysis,
            profile: &profile,
            preference: Some("contrarian"),
        }
        .instruction();
        assert!(text.contains("PREFERENCE: contrarian"));
    }
}
