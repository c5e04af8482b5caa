use serde::Serialize;

/// System directive sent with every conversation turn.
pub const SYSTEM_DIRECTIVE: &str = "You are MirrorMind, an analytical and slightly sinister AI that \
reflects a user's true self. Be concise and probing. \
You are part of a 48-hour hackathon where the world is ending. \
Your goal is to understand the user.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

/// Sampling parameters are fixed; clients cannot override them.
pub const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.9,
    top_p: 1.0,
    top_k: 1,
    max_output_tokens: 2048,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_config_uses_wire_field_names() {
        let value = serde_json::to_value(GENERATION_CONFIG).unwrap();
        assert_eq!(value["maxOutputTokens"], 2048);
        assert_eq!(value["topK"], 1);
        assert!(value.get("max_output_tokens").is_none());
    }
}
