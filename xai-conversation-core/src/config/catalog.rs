//! # Model Catalog
//!
//! Static table of the Grok models the adapter knows about and the
//! request features each one accepts.
//!
//! | Model | Chat | Reasoning effort | Live search | Vision | Image generation |
//! |-------|------|------------------|-------------|--------|------------------|
//! | `grok-4` | yes | | yes | yes | |
//! | `grok-4-fast-reasoning` | yes | | yes | yes | |
//! | `grok-4-fast-non-reasoning` | yes | | yes | yes | |
//! | `grok-code-fast-1` | yes | | | | |
//! | `grok-3` | yes | | yes | | |
//! | `grok-3-mini` | yes | yes | yes | | |
//! | `grok-2-vision` | yes | | | yes | |
//! | `grok-2-image` | | | | | yes |

use std::fmt;

/// Request features a model may or may not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Chat,
    ReasoningEffort,
    LiveSearch,
    Vision,
    ImageGeneration,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Chat => "chat",
            Capability::ReasoningEffort => "reasoning effort",
            Capability::LiveSearch => "live search",
            Capability::Vision => "image input",
            Capability::ImageGeneration => "image generation",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub chat: bool,
    pub reasoning_effort: bool,
    pub live_search: bool,
    pub vision: bool,
    pub image_generation: bool,
}

impl Capabilities {
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Chat => self.chat,
            Capability::ReasoningEffort => self.reasoning_effort,
            Capability::LiveSearch => self.live_search,
            Capability::Vision => self.vision,
            Capability::ImageGeneration => self.image_generation,
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier used in API calls
    pub id: &'static str,
    /// Human-readable name for menus
    pub name: &'static str,
    pub capabilities: Capabilities,
}

impl ModelInfo {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.supports(capability)
    }
}

const fn chat_model(
    id: &'static str,
    name: &'static str,
    reasoning_effort: bool,
    live_search: bool,
    vision: bool,
) -> ModelInfo {
    ModelInfo {
        id,
        name,
        capabilities: Capabilities {
            chat: true,
            reasoning_effort,
            live_search,
            vision,
            image_generation: false,
        },
    }
}

pub const XAI_MODELS: &[ModelInfo] = &[
    chat_model("grok-4", "Grok 4", false, true, true),
    chat_model("grok-4-fast-reasoning", "Grok 4 Fast (reasoning)", false, true, true),
    chat_model(
        "grok-4-fast-non-reasoning",
        "Grok 4 Fast (non-reasoning)",
        false,
        true,
        true,
    ),
    chat_model("grok-code-fast-1", "Grok Code Fast 1", false, false, false),
    chat_model("grok-3", "Grok 3", false, true, false),
    chat_model("grok-3-mini", "Grok 3 Mini", true, true, false),
    chat_model("grok-2-vision", "Grok 2 Vision", false, false, true),
    ModelInfo {
        id: "grok-2-image",
        name: "Grok 2 Image",
        capabilities: Capabilities {
            chat: false,
            reasoning_effort: false,
            live_search: false,
            vision: false,
            image_generation: true,
        },
    },
];

/// Look a model up by id (case-insensitive).
pub fn lookup(id: &str) -> Option<&'static ModelInfo> {
    XAI_MODELS
        .iter()
        .find(|model| model.id.eq_ignore_ascii_case(id.trim()))
}

/// `true` when the model is known and declares the capability.
pub fn model_supports(id: &str, capability: Capability) -> bool {
    lookup(id).is_some_and(|model| model.supports(capability))
}
