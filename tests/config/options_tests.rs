// Agent management tests - add, reconfigure, select and remove agents

use serial_test::serial;
use xai_conversation_core::config::{
    AgentKind, AgentOptions, AppConfig, ConfigError, OptionsUpdate, ReasoningEffort,
};

const KEY_VAR: &str = "XAI_CONVERSATION_OPTIONS_KEY";

fn config() -> AppConfig {
    // SAFETY: every test touching the environment is #[serial]
    unsafe { std::env::set_var(KEY_VAR, "xai-test-key") };
    AppConfig::parse(&format!("api_key = \"{KEY_VAR}\"\n")).expect("config")
}

#[test]
#[serial]
fn select_defaults_to_first_agent_of_kind() {
    let config = config();
    let conversation = config.select(None, AgentKind::Conversation).expect("conversation");
    assert_eq!(conversation.name, "xAI Conversation");
    let task = config.select(None, AgentKind::AiTask).expect("task");
    assert_eq!(task.name, "xAI AI Task");

    let named = config.select(Some("XAI AI TASK"), AgentKind::Conversation).expect("named");
    assert_eq!(named.kind, AgentKind::AiTask);
    assert!(matches!(
        config.select(Some("missing"), AgentKind::Conversation),
        Err(ConfigError::AgentNotFound { .. })
    ));
}

#[test]
#[serial]
fn add_agent_rejects_duplicates_and_invalid_options() {
    let mut config = config();
    config
        .add_agent(AgentOptions::recommended(AgentKind::Conversation).with_name("Living Room"))
        .expect("add");
    assert_eq!(config.agents.len(), 3);

    let duplicate = config.add_agent(AgentOptions::recommended(AgentKind::AiTask).with_name("living room"));
    assert!(matches!(duplicate, Err(ConfigError::DuplicateAgent { .. })));

    let mut invalid = AgentOptions::recommended(AgentKind::Conversation).with_name("Broken");
    invalid.max_tokens = 0;
    assert!(matches!(
        config.add_agent(invalid),
        Err(ConfigError::InvalidField { field: "max_tokens", .. })
    ));
    assert_eq!(config.agents.len(), 3);
}

#[test]
#[serial]
fn switching_to_advanced_keeps_unset_fields_and_seeds_reasoning() {
    let mut config = config();
    let updated = config
        .reconfigure_agent(
            "xAI Conversation",
            OptionsUpdate {
                recommended: Some(false),
                chat_model: Some("grok-3-mini".into()),
                temperature: Some(0.3),
                ..OptionsUpdate::default()
            },
        )
        .expect("reconfigure")
        .clone();

    assert!(!updated.recommended);
    assert_eq!(updated.chat_model, "grok-3-mini");
    assert_eq!(updated.temperature, 0.3);
    assert_eq!(updated.max_tokens, 4096);
    assert_eq!(updated.reasoning_effort, Some(ReasoningEffort::Medium));
    assert_eq!(config.agent("xAI Conversation").expect("agent"), &updated);
}

#[test]
#[serial]
fn enabling_recommended_discards_advanced_values() {
    let mut config = config();
    config
        .reconfigure_agent(
            "xAI Conversation",
            OptionsUpdate {
                recommended: Some(false),
                chat_model: Some("grok-3".into()),
                live_search: Some(false),
                ..OptionsUpdate::default()
            },
        )
        .expect("advanced");

    let updated = config
        .reconfigure_agent(
            "xAI Conversation",
            OptionsUpdate {
                recommended: Some(true),
                max_tokens: Some(12),
                stream: Some(false),
                ..OptionsUpdate::default()
            },
        )
        .expect("recommended");

    assert!(updated.recommended);
    assert_eq!(updated.chat_model, "grok-4-fast-non-reasoning");
    assert_eq!(updated.max_tokens, 4096);
    assert!(updated.live_search);
    assert_eq!(updated.reasoning_effort, None);
    assert!(!updated.stream);
}

#[test]
#[serial]
fn failed_reconfiguration_leaves_agent_untouched() {
    let mut config = config();
    let before = config.agent("xAI Conversation").expect("agent").clone();

    let result = config.reconfigure_agent(
        "xAI Conversation",
        OptionsUpdate {
            recommended: Some(false),
            top_p: Some(1.5),
            ..OptionsUpdate::default()
        },
    );
    assert!(matches!(result, Err(ConfigError::InvalidField { field: "top_p", .. })));
    assert_eq!(config.agent("xAI Conversation").expect("agent"), &before);
}

#[test]
#[serial]
fn prompt_and_tool_apis_can_be_cleared() {
    let mut config = config();
    config
        .reconfigure_agent(
            "xAI Conversation",
            OptionsUpdate {
                llm_apis: Some(vec!["clock".into()]),
                ..OptionsUpdate::default()
            },
        )
        .expect("set apis");

    let updated = config
        .reconfigure_agent(
            "xAI Conversation",
            OptionsUpdate {
                prompt: Some(String::new()),
                llm_apis: Some(Vec::new()),
                ..OptionsUpdate::default()
            },
        )
        .expect("clear");
    assert_eq!(updated.system_prompt(), None);
    assert!(updated.llm_apis.is_empty());
}

#[test]
#[serial]
fn remove_agent_returns_its_options() {
    let mut config = config();
    let removed = config.remove_agent("xai ai task").expect("remove");
    assert_eq!(removed.kind, AgentKind::AiTask);
    assert_eq!(config.agents.len(), 1);
    assert!(matches!(
        config.remove_agent("xAI AI Task"),
        Err(ConfigError::AgentNotFound { .. })
    ));
}
