// Oracle prompt templates for role validation and remote risk scoring.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Role validation prompt. Replace `{input}` before sending.
const ROLE_VALIDATION_TEMPLATE: &str = "\
You are a strict profession normalizer.
Given user input, decide if it is a realistic profession/job role.
If valid, convert to a concise standardized role title.
Return JSON with keys: is_valid (boolean), standardized_role (string), industry (string).
If invalid, set is_valid=false and standardized_role=\"\".
{json_only}
Input: {input}";

/// Risk scoring prompt. Replace `{title}` before sending.
const RISK_SCORING_TEMPLATE: &str = r#"Rate automation risk for the job "{title}" in India.
Return JSON in this format:
{
  "risk_score": number (0-100),
  "reason": string,
  "future_skills": string[]
}
{json_only}"#;

pub fn role_validation_prompt(raw_input: &str) -> String {
    ROLE_VALIDATION_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{input}", raw_input)
}

pub fn risk_scoring_prompt(title: &str) -> String {
    RISK_SCORING_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{title}", title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_input() {
        let p = role_validation_prompt("barista");
        assert!(p.ends_with("Input: barista"));
        assert!(p.contains("strict profession normalizer"));

        let p = risk_scoring_prompt("Barista");
        assert!(p.contains("\"Barista\""));
        assert!(!p.contains("{json_only}"));
    }
}
