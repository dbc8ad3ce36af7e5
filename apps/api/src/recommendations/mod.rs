// Scholarship Recommendation Pipeline
// Implements: profile normalization, curated + generative tiers, eligibility
// scoring, link validation, merge/dedup/ranking, and the fallback state machine.
// All LLM calls go through llm_client; no direct Gemini calls here.

pub mod curated;
pub mod eligibility;
pub mod generative;
pub mod handlers;
pub mod links;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_support;
