// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Common instruction appended to prompts that ask for URLs.
pub const REAL_LINKS_INSTRUCTION: &str = "\
    CRITICAL: You must provide the real, direct, and valid URL for every item's \
    information or application page. Do NOT use placeholder links like 'example.com'. \
    If you are not confident a page exists, omit the item entirely.";

/// Instruction that enforces a bare JSON array reply.
pub const JSON_ARRAY_ONLY_INSTRUCTION: &str = "\
    Return the entire output as a single, clean JSON array of objects. \
    Do NOT include any text before or after the JSON array. \
    Do NOT use markdown code fences.";
