//! Merchant to category suggestions.
//!
//! A free-text merchant key is compared against remembered
//! `merchant -> category` rules. Each rule is scored with the better of
//! Jaro-Winkler similarity and token overlap, scores are reduced to the best
//! per category, and a suggestion is only made when the winner is both
//! confident and clearly ahead of the runner-up.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum score a suggestion needs
    pub min_score: f64,
    /// Minimum lead over the best other category
    pub min_margin: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_score: 0.88,
            min_margin: 0.04,
        }
    }
}

/// A remembered assignment of a merchant to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantRule {
    pub merchant: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySuggestion {
    pub category: String,
    pub score: f64,
    /// Best score among the other categories, if any
    pub runner_up: Option<f64>,
}

/// Lowercases, turns anything that is not a letter or digit into a space and
/// collapses runs of whitespace.
pub fn normalize_merchant(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shared whitespace tokens over the larger token set.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    let larger = left.len().max(right.len());
    if larger == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / larger as f64
}

/// Similarity of two already-normalized merchant keys.
pub fn score(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    strsim::jaro_winkler(a, b).max(token_overlap(a, b))
}

#[derive(Debug, Clone, Default)]
pub struct MerchantMatcher {
    config: MatcherConfig,
    rules: Vec<MerchantRule>,
}

impl MerchantMatcher {
    pub fn new(config: MatcherConfig, rules: impl IntoIterator<Item = MerchantRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| MerchantRule {
                merchant: normalize_merchant(&rule.merchant),
                category: rule.category.trim().to_string(),
            })
            .filter(|rule| !rule.merchant.is_empty() && !rule.category.is_empty())
            .collect();
        Self { config, rules }
    }

    pub fn rules(&self) -> &[MerchantRule] {
        &self.rules
    }

    /// Records that `merchant` belongs to `category`, replacing any earlier
    /// rule for the same merchant key.
    pub fn remember(&mut self, merchant: &str, category: &str) {
        let merchant = normalize_merchant(merchant);
        let category = category.trim().to_string();
        if merchant.is_empty() || category.is_empty() {
            return;
        }
        self.rules.retain(|rule| rule.merchant != merchant);
        self.rules.push(MerchantRule { merchant, category });
    }

    /// Best category for `merchant`, or `None` when no category is both
    /// confident enough and far enough ahead.
    pub fn suggest(&self, merchant: &str) -> Option<CategorySuggestion> {
        let key = normalize_merchant(merchant);
        if key.is_empty() {
            return None;
        }

        let mut best_per_category: BTreeMap<&str, f64> = BTreeMap::new();
        for rule in &self.rules {
            let rule_score = score(&key, &rule.merchant);
            let entry = best_per_category.entry(rule.category.as_str()).or_insert(0.0);
            if rule_score > *entry {
                *entry = rule_score;
            }
        }

        let mut ranked: Vec<(&str, f64)> = best_per_category.into_iter().collect();
        ranked.sort_by(|x, y| y.1.total_cmp(&x.1));

        let (category, best) = *ranked.first()?;
        let runner_up = ranked.get(1).map(|(_, s)| *s);
        let margin = best - runner_up.unwrap_or(0.0);

        tracing::debug!(merchant = %key, category, best, ?runner_up, "merchant scored");
        if best >= self.config.min_score && margin >= self.config.min_margin {
            Some(CategorySuggestion {
                category: category.to_string(),
                score: best,
                runner_up,
            })
        } else {
            None
        }
    }
}
