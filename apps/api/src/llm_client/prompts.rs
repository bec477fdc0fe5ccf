// Shared prompt fragments.
// Each feature that needs oracle calls defines its own prompts.rs alongside it.

/// Appended to every prompt that expects a structured answer.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY JSON. No markdown. No extra text.";

/// Sampling temperature for classification-style prompts.
pub const PRECISE_TEMPERATURE: f32 = 0.1;

/// Sampling temperature for prompts that ask for free-text reasoning.
pub const REASONING_TEMPERATURE: f32 = 0.4;
