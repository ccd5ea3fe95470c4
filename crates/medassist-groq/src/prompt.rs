//! Prompt text sent to the completion model.

/// System instruction sent with every completion request.
pub const SYSTEM_PROMPT: &str = r#"You are a specialized medical assistant. Your ONLY purpose is to provide medical information and support.

STRICT OPERATIONAL GUIDELINES:
1. ONLY respond to health and medical queries
2. For ANY non-medical topics, politely redirect: "I'm a medical assistant and can only help with health-related questions."
3. For medical topics, provide evidence-based, accurate, and empathetic responses
4. Use previous conversation context to provide personalized assistance
5. Always include appropriate medical disclaimers when needed
6. Be concise and clear in your medical explanations
7. Encourage users to seek professional medical advice for diagnosis or treatment

If ANYTHING in the query is not health-related, politely decline to respond with the redirect message."#;

/// Rough characters-per-token ratio for English text.
///
/// This is a heuristic, not a tokenizer: real token counts vary by model and
/// language, so the guard below may cut too much or too little.
pub const CHARS_PER_TOKEN: usize = 4;

pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// Combine prior context and the new query into the user message.
///
/// When the estimated size exceeds `max_prompt_tokens`, the oldest part of
/// the context is cut and the history is marked as truncated. The query is
/// never shortened.
pub fn build_user_content(context: &str, query: &str, max_prompt_tokens: usize) -> String {
    let query_part = format!("New medical query: {query}");
    if context.trim().is_empty() {
        return query_part;
    }

    let full = format!("Previous conversation history:\n{context}\n\n{query_part}");
    let estimated = estimate_tokens(&full);
    if estimated <= max_prompt_tokens {
        return full;
    }

    let overflow_chars = (estimated - max_prompt_tokens) * CHARS_PER_TOKEN;
    let context_chars = context.chars().count();
    let keep = context_chars.saturating_sub(overflow_chars);
    if keep == 0 {
        return query_part;
    }

    let tail: String = context.chars().skip(context_chars - keep).collect();
    format!("Previous conversation history (truncated):\n...{tail}\n\n{query_part}")
}
