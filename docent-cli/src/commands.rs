//! CLI subcommand handlers and the ask flow.

use crate::Commands;
use crate::ConfigAction;
use docent_core::synthesizer::OllamaGenerator;
use docent_core::{Answer, DocentConfig, RagPipeline, create_embedder};
use std::path::Path;

/// Handle a CLI subcommand. `config` already carries CLI overrides.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config: DocentConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace, config).await,
        Commands::Index => handle_index(config).await,
    }
}

async fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config: DocentConfig,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".docent");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let default_config = DocentConfig::default();
            let toml_str = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

async fn handle_index(config: DocentConfig) -> anyhow::Result<()> {
    let mut pipeline = build_pipeline(config)?;
    let report = pipeline.build().await?;
    println!(
        "Indexed {} document(s) as {} chunk(s) ({} dims) in {} ms",
        report.documents, report.chunks, report.dimensions, report.elapsed_ms
    );
    Ok(())
}

/// Build the pipeline, index the document directory, and answer one question.
pub async fn ask(config: DocentConfig, question: &str) -> anyhow::Result<Answer> {
    let mut pipeline = build_pipeline(config)?;
    pipeline.build().await?;
    let answer = pipeline.query(question).await?;
    Ok(answer)
}

fn build_pipeline(config: DocentConfig) -> anyhow::Result<RagPipeline> {
    let embedder = create_embedder(&config.embedding)
        .map_err(|e| anyhow::anyhow!("Embedding configuration error: {}", e))?;
    let generator = OllamaGenerator::new(&config.llm)
        .map_err(|e| anyhow::anyhow!("Generator setup failed: {}", e))?;
    Ok(RagPipeline::new(config, embedder, Box::new(generator)))
}

/// Print source attributions beneath an answer.
pub fn print_sources(answer: &Answer) {
    if answer.sources.is_empty() {
        println!("\n(no sources retrieved)");
        return;
    }
    println!("\nSources ({} chunk(s), retrieved in {} ms):",
        answer.stats.chunks_used, answer.stats.retrieval_time_ms
    );
    for source in &answer.sources {
        println!(
            "  [{:.3}] {} — {}",
            source.score,
            source.source.display(),
            source.excerpt
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_init_creates_and_reports_existing() {
        let ws = tempfile::tempdir().unwrap();
        handle_config(ConfigAction::Init, ws.path(), DocentConfig::default())
            .await
            .unwrap();
        let config_path = ws.path().join(".docent").join("config.toml");
        assert!(config_path.exists());

        let contents = std::fs::read_to_string(&config_path).unwrap();
        let parsed: DocentConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed.retrieval.top_k, DocentConfig::default().retrieval.top_k);

        // Second init leaves the existing file untouched.
        std::fs::write(&config_path, "[llm]\nmodel = \"custom\"\n").unwrap();
        handle_config(ConfigAction::Init, ws.path(), DocentConfig::default())
            .await
            .unwrap();
        let contents = std::fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("custom"));
    }

    #[tokio::test]
    async fn test_index_honors_supplied_config() {
        // The workspace carries no config file; the data directory comes in
        // through the config argument (as CLI overrides do) and must be used.
        let ws = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        std::fs::write(data.path().join("a.txt"), "hello world").unwrap();

        let mut config = DocentConfig::default();
        config.embedding.provider = "hash".to_string();
        config.documents.data_dir = data.path().to_path_buf();
        handle_command(Commands::Index, ws.path(), config)
            .await
            .unwrap();

        // A config pointing at a missing directory fails rather than falling
        // back to whatever the workspace would have loaded.
        let mut config = DocentConfig::default();
        config.embedding.provider = "hash".to_string();
        config.documents.data_dir = data.path().join("missing");
        let err = handle_command(Commands::Index, ws.path(), config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_ask_with_hash_embedder_fails_on_missing_directory() {
        let ws = tempfile::tempdir().unwrap();
        let mut config = DocentConfig::default();
        config.embedding.provider = "hash".to_string();
        config.documents.data_dir = ws.path().join("missing");
        let err = ask(config, "anything").await.unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
