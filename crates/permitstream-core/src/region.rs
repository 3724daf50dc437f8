//! Region plausibility guard for fetched addresses.
//!
//! Some upstream portals occasionally serve records from the wrong
//! jurisdiction entirely. Each source carries an allow list of tokens its
//! addresses should contain and a deny list of tokens that mark a record
//! as foreign. Matching is case-insensitive on word boundaries; the guard
//! accepts when in doubt so sparse addresses are never dropped.

use std::collections::HashMap;

use tracing::debug;

/// Token lists for one source.
#[derive(Debug, Clone)]
pub struct RegionRule {
    /// Tokens an in-region address is expected to contain.
    pub allowed: Vec<&'static str>,
    /// Tokens that positively identify an out-of-region address.
    pub denied: Vec<&'static str>,
}

/// Per-source address plausibility filter.
#[derive(Debug, Default)]
pub struct RegionGuard {
    rules: HashMap<String, RegionRule>,
}

impl RegionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard preloaded with the rules for the built-in source catalog.
    pub fn builtin() -> Self {
        let mut guard = Self::new();
        guard.add_rule(
            "nashville",
            RegionRule {
                allowed: vec!["tn", "tennessee", "nashville"],
                denied: vec!["ky", "kentucky"],
            },
        );
        guard.add_rule(
            "chattanooga",
            RegionRule {
                allowed: vec!["tn", "tennessee", "chattanooga"],
                denied: vec!["ga", "georgia"],
            },
        );
        guard.add_rule(
            "charlotte",
            RegionRule {
                allowed: vec!["nc", "north carolina", "charlotte"],
                denied: vec!["sc", "south carolina"],
            },
        );
        guard.add_rule(
            "phoenix",
            RegionRule {
                allowed: vec!["az", "arizona", "phoenix", "scottsdale", "glendale"],
                denied: vec!["pa", "philadelphia"],
            },
        );
        guard.add_rule(
            "houston",
            RegionRule {
                allowed: vec!["tx", "texas"],
                denied: vec!["il", "chicago"],
            },
        );
        guard.add_rule(
            "austin",
            RegionRule {
                allowed: vec!["tx", "texas"],
                denied: vec!["ok", "oklahoma"],
            },
        );
        guard
    }

    pub fn add_rule(&mut self, source_id: impl Into<String>, rule: RegionRule) {
        self.rules.insert(source_id.into(), rule);
    }

    /// Returns `true` when `address` is plausible for `source_id`.
    ///
    /// A denied token rejects; an allowed token accepts; an address with
    /// neither signal (or a source with no rule) is accepted.
    pub fn validate(&self, source_id: &str, address: &str) -> bool {
        let Some(rule) = self.rules.get(source_id) else {
            return true;
        };
        let words = tokenize(address);
        if words.is_empty() {
            return true;
        }

        if rule.denied.iter().any(|token| contains_token(&words, token)) {
            debug!(source_id, address, "address rejected by region guard");
            return false;
        }
        if rule.allowed.iter().any(|token| contains_token(&words, token)) {
            return true;
        }

        // No signal either way; keep the record rather than guess.
        debug!(source_id, address, "address has no region signal, accepting");
        true
    }
}

fn tokenize(address: &str) -> Vec<String> {
    address
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Matches a single- or multi-word token against consecutive address words.
fn contains_token(words: &[String], token: &str) -> bool {
    let token_words: Vec<&str> = token.split_whitespace().collect();
    if token_words.is_empty() || token_words.len() > words.len() {
        return false;
    }
    words
        .windows(token_words.len())
        .any(|window| window.iter().zip(&token_words).all(|(w, t)| w == t))
}
