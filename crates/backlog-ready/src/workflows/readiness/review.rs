use serde::{Deserialize, Serialize};

use super::config::FieldAliases;
use crate::workflows::tracker::Issue;

const MIN_STRUCTURED_FIELD_CHARS: usize = 10;
const MIN_DESCRIPTION_CHARS: usize = 20;

/// Content excerpt paired with a question for an external (LLM or human) judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub field_name: String,
    pub criterion: String,
    pub content: String,
    pub prompt: String,
}

struct ReviewPrompt {
    field_name: &'static str,
    criterion: &'static str,
    prompt: &'static str,
}

const STORY_SYNTAX_PROMPT: ReviewPrompt = ReviewPrompt {
    field_name: "story_syntax",
    criterion: "Story syntax quality (As a... I want... So that...)",
    prompt: "Evaluate if this story syntax follows the format \"As a [user type] I want [feature] So that [benefit]\" and provides meaningful context. Is it complete and valuable, or just template text?",
};

const ACCEPTANCE_CRITERIA_PROMPT: ReviewPrompt = ReviewPrompt {
    field_name: "acceptance_criteria",
    criterion: "Acceptance criteria quality (BDD/Gherkin)",
    prompt: "Evaluate if these acceptance criteria use proper BDD/Gherkin format (Given/When/Then or Feature/Scenario format) and define testable, specific outcomes. Are they meaningful and complete, or just boilerplate?",
};

const DESCRIPTION_PROMPTS: [ReviewPrompt; 6] = [
    ReviewPrompt {
        field_name: "environments",
        criterion: "Environments defined (Staging/Pre-prod/Production)",
        prompt: "Does this description mention or discuss deployment to different environments like staging, pre-production, and production? Look for environment-specific concerns or deployment strategies.",
    },
    ReviewPrompt {
        field_name: "security",
        criterion: "Security posture/implications/risks defined",
        prompt: "Does this description address security considerations, risks, threats, authentication, authorization, data protection, or compliance requirements?",
    },
    ReviewPrompt {
        field_name: "documentation",
        criterion: "Relevant documentation identified",
        prompt: "Does this description reference or link to relevant documentation, wikis, Confluence pages, ADRs, or other knowledge base articles?",
    },
    ReviewPrompt {
        field_name: "demo",
        criterion: "What to demo has been defined",
        prompt: "Does this description specify what will be demonstrated or shown to stakeholders upon completion?",
    },
    ReviewPrompt {
        field_name: "cost",
        criterion: "Cost implications considered",
        prompt: "Does this description discuss cost implications, infrastructure expenses, licensing fees, or budget considerations?",
    },
    ReviewPrompt {
        field_name: "telemetry",
        criterion: "Telemetry considered - metrics and alerts defined",
        prompt: "Does this description specify telemetry, metrics, monitoring, alerts, dashboards, or observability requirements?",
    },
];

impl ReviewPrompt {
    fn item(&self, content: &str) -> ReviewItem {
        ReviewItem {
            field_name: self.field_name.to_string(),
            criterion: self.criterion.to_string(),
            content: content.to_string(),
            prompt: self.prompt.to_string(),
        }
    }
}

/// Packages long-form fields for qualitative review. Never scores anything.
pub(crate) fn collect_review_items(issue: &Issue, aliases: &FieldAliases) -> Vec<ReviewItem> {
    let mut items = Vec::new();

    let structured = [
        (aliases.story_syntax(), &STORY_SYNTAX_PROMPT),
        (aliases.acceptance_criteria(), &ACCEPTANCE_CRITERIA_PROMPT),
    ];
    for (field_id, prompt) in structured {
        let Some(value) = field_id.and_then(|id| issue.field(id)) else {
            continue;
        };
        if value.is_unset() {
            continue;
        }
        let content = value.text();
        if content.chars().count() > MIN_STRUCTURED_FIELD_CHARS {
            items.push(prompt.item(&content));
        }
    }

    let description = issue.description_text();
    if description.chars().count() > MIN_DESCRIPTION_CHARS {
        items.extend(DESCRIPTION_PROMPTS.iter().map(|prompt| prompt.item(&description)));
    }

    items
}
