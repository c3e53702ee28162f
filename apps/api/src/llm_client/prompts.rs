// Cross-cutting prompt fragments shared by every analysis prompt.
// Type-specific templates live in analysis::prompts.

/// Appended to every system prompt so the completion can be parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to user prompts whose input may be sparse.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    Base every statement on the information provided. \
    If something cannot be determined from the input, say so plainly instead of guessing. \
    Never invent employers, dates, metrics or company facts.";
