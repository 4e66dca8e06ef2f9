// Config loading tests - AppConfig::load with files and environment variables

use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;
use xai_conversation_core::config::{AgentKind, AppConfig, ConfigError, ReasoningEffort};

const KEY_VAR: &str = "XAI_CONVERSATION_TEST_KEY";

fn set_key(value: &str) {
    // SAFETY: every test touching the environment is #[serial]
    unsafe { std::env::set_var(KEY_VAR, value) };
}

fn clear_key() {
    // SAFETY: every test touching the environment is #[serial]
    unsafe { std::env::remove_var(KEY_VAR) };
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("xai.toml");
    fs::write(&path, content).expect("write xai.toml");
    path
}

fn load(content: &str) -> Result<AppConfig, ConfigError> {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), content);
    AppConfig::load(Some(&path))
}

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/xai.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
#[serial]
fn returns_error_when_api_key_variable_is_unset() {
    clear_key();
    let result = load(&format!("api_key = \"{KEY_VAR}\"\n"));
    assert!(matches!(result, Err(ConfigError::MissingApiKey { ref env_var }) if env_var == KEY_VAR));
}

#[test]
#[serial]
fn blank_api_key_counts_as_missing() {
    set_key("   ");
    let result = load(&format!("api_key = \"{KEY_VAR}\"\n"));
    assert!(matches!(result, Err(ConfigError::MissingApiKey { .. })));
    clear_key();
}

#[test]
#[serial]
fn empty_agent_list_creates_both_default_agents() {
    set_key("xai-test-key");
    let config = load(&format!("api_key = \"{KEY_VAR}\"\n")).expect("config");

    assert_eq!(config.api_key, "xai-test-key");
    assert_eq!(config.endpoint, "https://api.x.ai");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.agents.len(), 2);
    assert_eq!(config.agents[0].name, "xAI Conversation");
    assert_eq!(config.agents[0].kind, AgentKind::Conversation);
    assert!(config.agents[0].system_prompt().is_some());
    assert_eq!(config.agents[1].name, "xAI AI Task");
    assert_eq!(config.agents[1].kind, AgentKind::AiTask);
    assert!(config.agents.iter().all(|agent| agent.recommended));
    clear_key();
}

#[test]
#[serial]
fn advanced_agent_values_are_applied() {
    set_key("xai-test-key");
    let config = load(&format!(
        r#"
api_key = "{KEY_VAR}"
endpoint = "http://localhost:8089"
timeout_secs = 5

[[agents]]
name = "Kitchen"
recommended = false
chat_model = "grok-3-mini"
max_tokens = 1024
temperature = 0.2
top_p = 0.9
live_search = false
llm_apis = ["clock", "clock", " lights "]
"#
    ))
    .expect("config");

    assert_eq!(config.endpoint, "http://localhost:8089");
    assert_eq!(config.timeout, Duration::from_secs(5));
    let agent = config.agent("kitchen").expect("case-insensitive lookup");
    assert!(!agent.recommended);
    assert_eq!(agent.chat_model, "grok-3-mini");
    assert_eq!(agent.max_tokens, 1024);
    assert!(!agent.live_search);
    assert_eq!(agent.reasoning_effort, Some(ReasoningEffort::Medium));
    assert_eq!(agent.llm_apis, vec!["clock", "lights"]);
    clear_key();
}

#[test]
#[serial]
fn recommended_agent_ignores_advanced_values() {
    set_key("xai-test-key");
    let config = load(&format!(
        r#"
api_key = "{KEY_VAR}"

[[agents]]
name = "Simple"
chat_model = "grok-3"
temperature = 1.5
"#
    ))
    .expect("config");

    let agent = config.agent("Simple").expect("agent");
    assert!(agent.recommended);
    assert_eq!(agent.chat_model, "grok-4-fast-non-reasoning");
    assert_eq!(agent.temperature, 0.7);
    clear_key();
}

#[test]
#[serial]
fn invalid_agents_are_rejected() {
    set_key("xai-test-key");

    let out_of_range = load(&format!(
        "api_key = \"{KEY_VAR}\"\n[[agents]]\nname = \"Hot\"\nrecommended = false\ntemperature = 2.5\n"
    ));
    assert!(matches!(
        out_of_range,
        Err(ConfigError::InvalidField { field: "temperature", .. })
    ));

    let unknown = load(&format!(
        "api_key = \"{KEY_VAR}\"\n[[agents]]\nname = \"Odd\"\nrecommended = false\nchat_model = \"grok-99\"\n"
    ));
    assert!(matches!(unknown, Err(ConfigError::UnknownModel { .. })));

    let image_only = load(&format!(
        "api_key = \"{KEY_VAR}\"\n[[agents]]\nname = \"Painter\"\nrecommended = false\nchat_model = \"grok-2-image\"\n"
    ));
    assert!(matches!(image_only, Err(ConfigError::UnsuitableModel { purpose: "chat", .. })));

    let duplicate = load(&format!(
        "api_key = \"{KEY_VAR}\"\n[[agents]]\nname = \"Twin\"\n[[agents]]\nname = \"twin\"\n"
    ));
    assert!(matches!(duplicate, Err(ConfigError::DuplicateAgent { .. })));

    let too_many_results = load(&format!(
        "api_key = \"{KEY_VAR}\"\n[[agents]]\nname = \"Search\"\nrecommended = false\nmax_search_results = 51\n"
    ));
    assert!(matches!(
        too_many_results,
        Err(ConfigError::InvalidField { field: "max_search_results", .. })
    ));
    clear_key();
}

#[test]
#[serial]
fn malformed_toml_is_a_parse_error() {
    set_key("xai-test-key");
    let result = load("api_key = [unclosed");
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
    clear_key();
}

#[test]
#[serial]
fn serialized_config_keeps_variable_name_not_secret() {
    set_key("super-secret-value");
    let config = load(&format!("api_key = \"{KEY_VAR}\"\n")).expect("config");
    let rendered = config.to_toml().expect("toml");

    assert!(rendered.contains(KEY_VAR));
    assert!(!rendered.contains("super-secret-value"));
    assert!(!format!("{config:?}").contains("super-secret-value"));

    let reloaded = AppConfig::parse(&rendered).expect("reparse");
    assert_eq!(reloaded.agents, config.agents);
    clear_key();
}
