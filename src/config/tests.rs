#[cfg(test)]
mod tests {
    use crate::config::{Config, LLMConfig, LLMProvider, ReportConfig, SearchConfig, WikiConfig};
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert!(config.output_path.is_none());
        assert!(!config.stream_events);
        assert!(!config.check_connection);
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::Gemini);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "DeepSeek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "gemini".parse::<LLMProvider>().unwrap(),
            LLMProvider::Gemini
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display_round_trips() {
        for provider in [
            LLMProvider::OpenAI,
            LLMProvider::Moonshot,
            LLMProvider::DeepSeek,
            LLMProvider::Mistral,
            LLMProvider::OpenRouter,
            LLMProvider::Anthropic,
            LLMProvider::Gemini,
            LLMProvider::Ollama,
        ] {
            assert_eq!(provider.to_string().parse::<LLMProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::Gemini);
        // api_key may be empty if env var is not set
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.timeout_seconds, 300);
    }

    #[test]
    fn test_search_config_default() {
        let config = SearchConfig::default();

        assert_eq!(config.max_queries, 20);
        assert_eq!(config.max_query_words, 8);
        assert_eq!(config.min_primary_chars, 20);
        assert_eq!(config.fallback_max_results, 3);
        assert_eq!(config.fallback_timeout(), Duration::from_secs(10));
        assert_eq!(config.pacing(), Duration::from_secs(1));
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_wiki_config_default() {
        let config = WikiConfig::default();

        assert_eq!(config.max_titles, 5);
        assert_eq!(config.max_title_chars, 50);
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.pacing(), Duration::from_millis(500));
        assert_eq!(config.top_k_results, 5);
        assert_eq!(config.doc_content_chars_max, 3000);
        assert_eq!(config.error_message_chars, 200);
    }

    #[test]
    fn test_report_config_default() {
        let config = ReportConfig::default();

        assert_eq!(config.min_compilation_chars, 50);
        assert_eq!(config.max_compilation_chars, 40_000);
        assert_eq!(config.fallback_excerpt_chars, 4000);
    }

    #[test]
    fn test_from_file_partial_overrides_keep_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("deepreport.toml");

        let content = r#"
verbose = true
output_path = "report.md"

[llm]
provider = "openai"
model = "gpt-4o-mini"

[wiki]
timeout_seconds = 5
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();

        assert!(config.verbose);
        assert_eq!(config.output_path, Some(PathBuf::from("report.md")));
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.wiki.timeout_seconds, 5);
        assert_eq!(config.wiki.max_titles, 5);
        assert_eq!(config.search.max_queries, 20);
    }

    #[test]
    fn test_from_file_missing_file() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/deepreport.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        std::fs::write(&config_path, "[llm\nprovider = ").unwrap();

        let result = Config::from_file(&config_path);
        assert!(result.is_err());
    }
}
