//! Shared builders for the integration tests: requests, scripted stage replies and
//! orchestrators wired to a [`ReplayBackend`].

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use postspin::{
    AdoptionPolicy, CompanyProfile, GeneratorSettings, ReplayBackend, SourcePost, SpinOptions,
    SpinOrchestrator, SpinRequest, SpinThresholds, StageId, StructuredGenerator,
};

/// The finance / list-teaser request used by the end-to-end scenarios.
pub fn finance_request() -> SpinRequest {
    SpinRequest {
        original_post: SourcePost {
            content: "7 money lessons I learned the hard way as a first-time founder".to_string(),
            author_name: "Priya Raman".to_string(),
            likes: 4200,
            comments: 310,
            shares: 95,
            category: Some("finance".to_string()),
            hook_type: Some("list_teaser".to_string()),
            structure_type: Some("listicle".to_string()),
        },
        company_profile: CompanyProfile {
            company_name: "Harbor Ledger".to_string(),
            industry: "finance".to_string(),
            tone_of_voice: vec!["professional".to_string()],
            key_messages: vec!["Cash flow clarity for small teams".to_string()],
            values: vec!["transparency".to_string()],
            target_audience: None,
            differentiators: None,
        },
        spin_options: SpinOptions::default(),
    }
}

pub fn finance_request_json() -> Value {
    json!({
        "original_post": {
            "content": "7 money lessons I learned the hard way as a first-time founder",
            "author_name": "Priya Raman",
            "likes": 4200,
            "hook_type": "list_teaser"
        },
        "company_profile": {
            "company_name": "Harbor Ledger",
            "industry": "finance",
            "tone_of_voice": ["professional"]
        }
    })
}

pub fn analysis_reply() -> Value {
    json!({
        "hook_type": "list_teaser",
        "hook_text": "7 money lessons I learned the hard way",
        "structure_type": "listicle",
        "cta_type": "question",
        "universal_theme": "Hard-won lessons about managing money early",
        "core_message": "Small cash habits compound",
        "emotional_trigger": "vulnerability",
        "readability_score": 82,
        "company_specific_elements": ["first-time founder story"],
        "adaptability_score": 78
    })
}

pub fn angles_reply(recommended: i64) -> Value {
    let angle = |name: &str, originality: u32| {
        json!({
            "angle_name": name,
            "angle_description": "Reframe the lessons for finance teams",
            "differentiation": "Speaks from the ledger, not the founder",
            "hook_idea": "What your books told you last quarter",
            "relevance_to_company": 84,
            "originality_score": originality
        })
    };
    json!({
        "angles": [
            angle("Ledger lessons", 80),
            angle("Cash flow myths", 88),
            angle("Quarter-end checklist", 72)
        ],
        "recommended_angle_index": recommended
    })
}

pub fn draft_reply(authenticity: f64, originality: f64, needs_revision: bool) -> Value {
    json!({
        "draft_content": "Writer draft about cash flow habits.",
        "hashtags": ["Finance", "#SmallBusiness"],
        "authenticity_score": authenticity,
        "originality_score": originality,
        "predicted_engagement": 64,
        "ai_patterns_detected": ["Let's dive in"],
        "weaknesses": ["generic opener"],
        "needs_revision": needs_revision
    })
}

pub fn revision_reply(content: &str, authenticity: f64, originality: f64, ready: bool) -> Value {
    json!({
        "revised_content": content,
        "changes_made": ["shorter sentences"],
        "final_authenticity_score": authenticity,
        "final_originality_score": originality,
        "ready_to_publish": ready
    })
}

/// A backend answering analyzer, angle and writer calls once each plus the given
/// humanizer replies in order.
pub fn scripted(draft: Value, revisions: &[Value]) -> ReplayBackend {
    let backend = ReplayBackend::new();
    backend.push(StageId::Analyzer, analysis_reply().to_string());
    backend.push(StageId::AngleGenerator, angles_reply(1).to_string());
    backend.push(StageId::Writer, draft.to_string());
    for revision in revisions {
        backend.push(StageId::Humanizer, revision.to_string());
    }
    backend
}

pub fn thresholds(max_iterations: u32, adoption: AdoptionPolicy) -> SpinThresholds {
    SpinThresholds {
        max_humanization_iterations: max_iterations,
        adoption,
        ..SpinThresholds::default()
    }
}

pub fn orchestrator_with(backend: &ReplayBackend, thresholds: SpinThresholds) -> SpinOrchestrator {
    let generator = StructuredGenerator::new(
        Arc::new(backend.clone()),
        GeneratorSettings::with_timeout(Duration::from_secs(5)),
    );
    SpinOrchestrator::new(generator, thresholds)
}

pub fn orchestrator(backend: &ReplayBackend) -> SpinOrchestrator {
    orchestrator_with(backend, SpinThresholds::default())
}
