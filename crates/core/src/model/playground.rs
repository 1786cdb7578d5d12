use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::SessionId;
use crate::model::settings::ApiProvider;

/// Maximum number of sessions kept in history.
pub const HISTORY_LIMIT: usize = 100;

/// USD per million prompt tokens.
const INPUT_PRICE_PER_MILLION: f64 = 3.0;
/// USD per million completion tokens.
const OUTPUT_PRICE_PER_MILLION: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    pub provider: ApiProvider,
    pub name: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
            top_p: None,
            top_k: None,
            stop_sequences: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

impl TokenUsage {
    /// Usage with totals and estimated cost filled in.
    #[must_use]
    pub fn priced(prompt_tokens: u64, completion_tokens: u64) -> Self {
        let mut usage = Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            estimated_cost: None,
        };
        usage.estimated_cost = Some(estimate_cost(&usage));
        usage
    }
}

/// One prompt sent to the model and what came back.
///
/// Exactly one of `response` / `error` is normally set once the call settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaygroundSession {
    pub id: SessionId,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub model: AiModel,
    pub parameters: ModelParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<TokenUsage>,
}

impl PlaygroundSession {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Estimated USD cost, rounded to 4 decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_cost(usage: &TokenUsage) -> f64 {
    let input = usage.prompt_tokens as f64 / 1_000_000.0 * INPUT_PRICE_PER_MILLION;
    let output = usage.completion_tokens as f64 / 1_000_000.0 * OUTPUT_PRICE_PER_MILLION;
    round_to(input + output, 4)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

//
// ─── HISTORY ───────────────────────────────────────────────────────────────────
//

/// Prepend `session` and evict the oldest entries past the limit.
pub fn push_session(history: &mut Vec<PlaygroundSession>, session: PlaygroundSession) {
    history.insert(0, session);
    history.truncate(HISTORY_LIMIT);
}

/// Merge imported sessions ahead of the current history.
///
/// The first occurrence of an id wins, so imported entries take precedence
/// over local ones with the same id. The result is capped at the limit.
#[must_use]
pub fn merge_history(
    imported: Vec<PlaygroundSession>,
    current: Vec<PlaygroundSession>,
) -> Vec<PlaygroundSession> {
    let mut seen = HashSet::new();
    imported
        .into_iter()
        .chain(current)
        .filter(|session| seen.insert(session.id.clone()))
        .take(HISTORY_LIMIT)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatistics {
    pub total_sessions: usize,
    pub successful_sessions: usize,
    pub failed_sessions: usize,
    pub total_tokens: u64,
    /// USD, rounded to cents.
    pub total_cost: f64,
    pub average_tokens_per_session: u64,
}

#[must_use]
pub fn usage_statistics(sessions: &[PlaygroundSession]) -> UsageStatistics {
    let mut total_tokens = 0_u64;
    let mut total_cost = 0.0_f64;
    let mut failed = 0;

    for session in sessions {
        if let Some(usage) = &session.tokens_used {
            total_tokens += usage.total_tokens;
            total_cost += usage.estimated_cost.unwrap_or(0.0);
        }
        if session.is_failed() {
            failed += 1;
        }
    }

    let average = if sessions.is_empty() {
        0
    } else {
        let count = sessions.len() as u64;
        (total_tokens + count / 2) / count
    };

    UsageStatistics {
        total_sessions: sessions.len(),
        successful_sessions: sessions.len() - failed,
        failed_sessions: failed,
        total_tokens,
        total_cost: round_to(total_cost, 2),
        average_tokens_per_session: average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn session(id: &str) -> PlaygroundSession {
        PlaygroundSession {
            id: SessionId::new(id),
            prompt: format!("prompt {id}"),
            system_prompt: None,
            model: AiModel {
                provider: ApiProvider::Anthropic,
                name: "test-model".into(),
                max_tokens: 4096,
            },
            parameters: ModelParameters::default(),
            response: None,
            error: None,
            timestamp: fixed_now(),
            tokens_used: None,
        }
    }

    #[test]
    fn cost_uses_input_and_output_prices() {
        let usage = TokenUsage::priced(1_000_000, 1_000_000);
        assert!((usage.estimated_cost.unwrap() - 18.0).abs() < 1e-9);

        let small = TokenUsage::priced(1_234, 567);
        // 0.003702 + 0.008505 = 0.012207 -> 0.0122
        assert!((small.estimated_cost.unwrap() - 0.0122).abs() < 1e-9);
        assert_eq!(small.total_tokens, 1_801);
    }

    #[test]
    fn push_evicts_oldest_past_limit() {
        let mut history: Vec<_> = (0..HISTORY_LIMIT).map(|i| session(&format!("s{i}"))).collect();
        push_session(&mut history, session("newest"));
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].id, "newest");
        assert_eq!(history[HISTORY_LIMIT - 1].id, "s98");
    }

    #[test]
    fn merge_prefers_imported_duplicates() {
        let mut imported = session("shared");
        imported.response = Some("from import".into());
        let current = vec![session("local"), session("shared")];

        let merged = merge_history(vec![imported, session("new")], current);
        let ids: Vec<_> = merged.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["shared", "new", "local"]);
        assert_eq!(merged[0].response.as_deref(), Some("from import"));
    }

    #[test]
    fn merge_caps_at_limit() {
        let imported: Vec<_> = (0..80).map(|i| session(&format!("i{i}"))).collect();
        let current: Vec<_> = (0..80).map(|i| session(&format!("c{i}"))).collect();
        let merged = merge_history(imported, current);
        assert_eq!(merged.len(), HISTORY_LIMIT);
        assert_eq!(merged[80].id, "c0");
    }

    #[test]
    fn statistics_split_success_and_failure() {
        let mut ok = session("ok");
        ok.response = Some("hi".into());
        ok.tokens_used = Some(TokenUsage::priced(100, 50));
        let mut failed = session("failed");
        failed.error = Some("boom".into());

        let stats = usage_statistics(&[ok, failed]);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.successful_sessions, 1);
        assert_eq!(stats.failed_sessions, 1);
        assert_eq!(stats.total_tokens, 150);
        assert_eq!(stats.average_tokens_per_session, 75);
        assert!(stats.total_cost.abs() < f64::EPSILON);
    }

    #[test]
    fn statistics_for_empty_history() {
        let stats = usage_statistics(&[]);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.average_tokens_per_session, 0);
    }
}
