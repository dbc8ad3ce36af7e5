// All LLM prompt constants for the Recommendations module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for scholarship search. Enforces JSON-array output.
pub const RECOMMENDATION_SYSTEM: &str = "You are an expert scholarship search assistant. \
    Your task is to find real, currently active scholarships based on a student's profile. \
    You MUST respond with valid JSON only: a JSON array of scholarship objects. \
    Do NOT include explanations or apologies.";

/// Scholarship search prompt template.
/// Replace: {min_results}, {max_results}, {links_instruction}, {json_instruction},
///          {education_level}, {gpa}, {major_field}, {nationality}, {interests},
///          {achievements}
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Find {min_results} to {max_results} scholarships that are a strong match for the student below.

{links_instruction}
If a deadline has passed for the current year, find the link for the upcoming year if possible.

STUDENT PROFILE:
- Education Level: {education_level}
- GPA: {gpa}
- Major/Field of Study: {major_field}
- Nationality: {nationality}
- Interests: {interests}
- Key Achievements: {achievements}

{json_instruction}

REQUIRED JSON FORMAT:
[
  {
    "name": "Full Name of the Scholarship",
    "eligibility": "Key eligibility criteria (e.g., major, GPA, nationality).",
    "deadline": "Application deadline in YYYY-MM-DD format. If not available, state 'Varies'.",
    "amount": "The award amount (e.g., '$10,000' or 'Varies').",
    "link": "The valid, direct URL to the scholarship page.",
    "reason": "A brief, 1-2 sentence explanation of why this scholarship is a good match for the student.",
    "match_score": 0.85
  }
]

HARD RULES:
1. EVERY object MUST have a non-empty `name` and `link`
2. `match_score` is your confidence that the student qualifies, between 0.0 and 1.0
3. Order the array from best match to weakest match
4. Do NOT repeat the same scholarship twice"#;
