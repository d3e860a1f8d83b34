//! Static metadata for the models served by Nebius AI Studio.

use serde::Serialize;

/// Capabilities and pricing of a model. Prices are USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelInfo {
    pub max_tokens: u32,
    pub context_window: u32,
    pub supports_images: bool,
    pub supports_prompt_cache: bool,
    pub input_price: f64,
    pub output_price: f64,
    pub description: Option<&'static str>,
}

impl ModelInfo {
    const fn text(max_tokens: u32, context_window: u32, input_price: f64, output_price: f64) -> Self {
        Self {
            max_tokens,
            context_window,
            supports_images: false,
            supports_prompt_cache: false,
            input_price,
            output_price,
            description: None,
        }
    }

    /// Cost in USD of a request with the given token counts.
    pub fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (self.input_price * input_tokens as f64 + self.output_price * output_tokens as f64) / 1_000_000.0
    }
}

/// A resolved model: its table key and metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApiModel {
    pub id: &'static str,
    pub info: ModelInfo,
}

pub const NEBIUS_DEFAULT_MODEL_ID: &str = "Qwen/Qwen2.5-32B-Instruct-fast";

pub const NEBIUS_DEFAULT_MODEL: ApiModel = ApiModel {
    id: NEBIUS_DEFAULT_MODEL_ID,
    info: ModelInfo::text(8_192, 32_768, 0.13, 0.4),
};

pub static NEBIUS_MODELS: &[(&str, ModelInfo)] = &[
    ("deepseek-ai/DeepSeek-V3", ModelInfo::text(32_000, 96_000, 0.5, 1.5)),
    ("deepseek-ai/DeepSeek-V3-0324-fast", ModelInfo::text(128_000, 128_000, 2.0, 6.0)),
    ("deepseek-ai/DeepSeek-R1", ModelInfo::text(32_000, 96_000, 0.8, 2.4)),
    ("deepseek-ai/DeepSeek-R1-fast", ModelInfo::text(32_000, 96_000, 2.0, 6.0)),
    ("meta-llama/Llama-3.3-70B-Instruct-fast", ModelInfo::text(32_000, 96_000, 0.25, 0.75)),
    (NEBIUS_DEFAULT_MODEL.id, NEBIUS_DEFAULT_MODEL.info),
    ("Qwen/Qwen2.5-Coder-32B-Instruct-fast", ModelInfo::text(128_000, 128_000, 0.1, 0.3)),
    ("Qwen/QwQ-32B", ModelInfo::text(32_000, 96_000, 0.15, 0.45)),
    ("Qwen/QwQ-32B-fast", ModelInfo::text(32_000, 96_000, 0.5, 1.5)),
];

/// Look up a model by its exact id.
pub fn nebius_model(id: &str) -> Option<ApiModel> {
    NEBIUS_MODELS
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(key, info)| ApiModel { id: *key, info: *info })
}

/// The default model entry.
pub fn nebius_default_model() -> ApiModel {
    NEBIUS_DEFAULT_MODEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_is_in_table() {
        let model = nebius_default_model();
        assert_eq!(model.id, NEBIUS_DEFAULT_MODEL_ID);
        assert_eq!(model.info.context_window, 32_768);
        assert_eq!(nebius_model(NEBIUS_DEFAULT_MODEL_ID), Some(model));
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(nebius_model("deepseek-ai/DeepSeek-R1").is_some());
        assert!(nebius_model("deepseek-ai/deepseek-r1").is_none());
        assert!(nebius_model("").is_none());
    }

    #[test]
    fn test_model_ids_are_unique() {
        for (i, (id, _)) in NEBIUS_MODELS.iter().enumerate() {
            assert!(NEBIUS_MODELS[i + 1..].iter().all(|(other, _)| other != id));
        }
    }

    #[test]
    fn test_calculate_cost() {
        let info = nebius_model("deepseek-ai/DeepSeek-R1").unwrap().info;
        let cost = info.calculate_cost(1_000_000, 500_000);
        assert!((cost - 2.0).abs() < 1e-9);
    }
}
