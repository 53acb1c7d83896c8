//! The caller's input: a source post, the target company and spin options.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::validation::parse_label;

/// Voice requested for the spun post.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
    EnumString, IntoStaticStr, VariantNames,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Inspirational,
}

impl TryFrom<String> for Tone {
    type Error = String;
    fn try_from(raw: String) -> Result<Self, Self::Error> {
        parse_label(&raw)
    }
}

/// A post that performed well for someone else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePost {
    pub content: String,
    pub author_name: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hook_type: Option<String>,
    #[serde(default)]
    pub structure_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetAudience {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
}

/// The company the new post is written for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub industry: String,
    #[serde(default)]
    pub tone_of_voice: Vec<String>,
    #[serde(default)]
    pub key_messages: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub target_audience: Option<TargetAudience>,
    #[serde(default)]
    pub differentiators: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOptions {
    /// `None` means the configured default tone applies.
    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub angle_preference: Option<String>,
    #[serde(default = "default_include_cta")]
    pub include_cta: bool,
}

fn default_include_cta() -> bool {
    true
}

impl Default for SpinOptions {
    fn default() -> Self {
        Self {
            tone: None,
            angle_preference: None,
            include_cta: true,
        }
    }
}

impl SpinOptions {
    #[must_use]
    pub fn tone_or(&self, fallback: Tone) -> Tone {
        self.tone.unwrap_or(fallback)
    }

    /// The angle preference, ignoring blank strings.
    #[must_use]
    pub fn angle_preference(&self) -> Option<&str> {
        self.angle_preference
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Everything needed to spin one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinRequest {
    pub original_post: SourcePost,
    pub company_profile: CompanyProfile,
    #[serde(default)]
    pub spin_options: SpinOptions,
}

impl SpinRequest {
    /// Check the fields the pipeline cannot work without.
    ///
    /// # Errors
    ///
    /// Returns one message per missing or blank required field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let required = [
            ("original_post.content", &self.original_post.content),
            ("original_post.author_name", &self.original_post.author_name),
            ("company_profile.company_name", &self.company_profile.company_name),
            ("company_profile.industry", &self.company_profile.industry),
        ];
        let issues: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| format!("{field} must not be empty"))
            .collect();
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> serde_json::Value {
        json!({
            "original_post": { "content": "Hiring is a product problem.", "author_name": "Dana Ortiz" },
            "company_profile": { "company_name": "Northwind", "industry": "logistics" }
        })
    }

    #[test]
    fn defaults_apply_when_fields_are_absent() {
        let request: SpinRequest = serde_json::from_value(minimal()).unwrap();
        assert_eq!(request.original_post.likes, 0);
        assert!(request.company_profile.tone_of_voice.is_empty());
        assert!(request.company_profile.target_audience.is_none());
        assert!(request.spin_options.include_cta);
        assert_eq!(request.spin_options.tone_or(Tone::Casual), Tone::Casual);
        request.validate().unwrap();
    }

    #[test]
    fn explicit_options_are_kept() {
        let mut value = minimal();
        value["spin_options"] = json!({
            "tone": "Inspirational",
            "angle_preference": "   ",
            "include_cta": false
        });
        let request: SpinRequest = serde_json::from_value(value).unwrap();
        assert_eq!(
            request.spin_options.tone_or(Tone::Professional),
            Tone::Inspirational
        );
        assert_eq!(request.spin_options.angle_preference(), None);
        assert!(!request.spin_options.include_cta);
    }

    #[test]
    fn unknown_tone_is_rejected() {
        let mut value = minimal();
        value["spin_options"] = json!({ "tone": "sarcastic" });
        assert!(serde_json::from_value::<SpinRequest>(value).is_err());
    }

    #[test]
    fn blank_required_fields_are_reported() {
        let mut value = minimal();
        value["original_post"]["content"] = json!("  ");
        value["company_profile"]["industry"] = json!("");
        let request: SpinRequest = serde_json::from_value(value).unwrap();
        let issues = request.validate().unwrap_err();
        assert_eq!(
            issues,
            vec![
                "original_post.content must not be empty",
                "company_profile.industry must not be empty"
            ]
        );
    }
}
