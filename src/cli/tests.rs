#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::config::LLMProvider;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(&["deepreport-rs", "--topic", "rust"]).unwrap();

        assert_eq!(args.topic, "rust");
        assert!(args.config.is_none());
        assert!(args.output.is_none());
        assert!(!args.events);
        assert!(!args.check_connection);
        assert!(!args.verbose);
    }

    #[test]
    fn test_topic_is_required() {
        assert!(Args::try_parse_from(&["deepreport-rs"]).is_err());
    }

    #[test]
    fn test_args_short_options() {
        let args = Args::try_parse_from(&[
            "deepreport-rs",
            "-t", "quantum computing",
            "-o", "/tmp/report.md",
            "-c", "/config.toml",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.topic, "quantum computing");
        assert_eq!(args.output, Some(PathBuf::from("/tmp/report.md")));
        assert_eq!(args.config, Some(PathBuf::from("/config.toml")));
        assert!(args.verbose);
    }

    #[test]
    fn test_args_llm_options() {
        let args = Args::try_parse_from(&[
            "deepreport-rs",
            "--topic", "rust",
            "--llm-provider", "openai",
            "--llm-api-key", "test-key",
            "--llm-api-base-url", "https://api.openai.com",
            "--model", "gpt-4o-mini",
            "--max-tokens", "2048",
            "--temperature", "0.7",
        ])
        .unwrap();

        assert_eq!(args.llm_provider, Some("openai".to_string()));
        assert_eq!(args.llm_api_key, Some("test-key".to_string()));
        assert_eq!(args.llm_api_base_url, Some("https://api.openai.com".to_string()));
        assert_eq!(args.model, Some("gpt-4o-mini".to_string()));
        assert_eq!(args.max_tokens, Some(2048));
        assert_eq!(args.temperature, Some(0.7));
    }

    #[test]
    fn test_into_config_basic() {
        let args = Args::try_parse_from(&["deepreport-rs", "--topic", "rust"]).unwrap();

        let config = args.into_config().unwrap();

        assert!(config.output_path.is_none());
        assert!(!config.stream_events);
        assert!(!config.check_connection);
        assert!(!config.verbose);
        assert_eq!(config.search.pacing_ms, 1000);
        assert_eq!(config.wiki.timeout_seconds, 20);
    }

    #[test]
    fn test_into_config_with_overrides() {
        let args = Args::try_parse_from(&[
            "deepreport-rs",
            "--topic", "rust",
            "--output", "report.md",
            "--events",
            "--check-connection",
            "--verbose",
            "--llm-provider", "ollama",
            "--model", "llama3",
            "--search-pacing-ms", "0",
            "--wiki-timeout-seconds", "5",
        ])
        .unwrap();

        let config = args.into_config().unwrap();

        assert_eq!(config.output_path, Some(PathBuf::from("report.md")));
        assert!(config.stream_events);
        assert!(config.check_connection);
        assert!(config.verbose);
        assert_eq!(config.llm.provider, LLMProvider::Ollama);
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.search.pacing_ms, 0);
        assert_eq!(config.wiki.timeout_seconds, 5);
    }

    #[test]
    fn test_invalid_llm_provider_keeps_default() {
        let args = Args::try_parse_from(&[
            "deepreport-rs",
            "--topic", "rust",
            "--llm-provider", "invalid",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.llm.provider, LLMProvider::Gemini);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("deepreport.toml");
        std::fs::write(
            &config_path,
            r#"
stream_events = true

[llm]
provider = "anthropic"
model = "claude-from-file"

[wiki]
max_titles = 3
"#,
        )
        .unwrap();

        let args = Args::try_parse_from(&[
            "deepreport-rs",
            "--topic", "rust",
            "--config", config_path.to_str().unwrap(),
            "--model", "model-from-cli",
        ])
        .unwrap();

        let config = args.into_config().unwrap();

        assert!(config.stream_events);
        assert_eq!(config.llm.provider, LLMProvider::Anthropic);
        assert_eq!(config.llm.model, "model-from-cli");
        assert_eq!(config.wiki.max_titles, 3);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let args = Args::try_parse_from(&[
            "deepreport-rs",
            "--topic", "rust",
            "--config", "/definitely/not/here.toml",
        ])
        .unwrap();

        assert!(args.into_config().is_err());
    }
}
