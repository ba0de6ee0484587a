//! Init command implementation
//!
//! Writes a default `ragline.toml` and a `.env.example` listing the
//! environment variables the default providers read.

use super::output::Output;
use crate::utils::config::RagConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file written by `ragline init`
pub const CONFIG_FILE: &str = "ragline.toml";

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (ragline.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing ragline");

    let base_path = &config.path;
    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    let config_path = base_path.join(CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating configuration files");

    let toml_content = match generate_config_toml() {
        Ok(content) => content,
        Err(e) => {
            output.error(&format!("Failed to render {}: {}", CONFIG_FILE, e));
            return InitResult::Error(e);
        }
    };
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create {}: {}", CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", CONFIG_FILE);

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.skipped(".env.example", "already exists");
    } else if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("env", ".env.example");
    }

    output.complete("ragline initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set OPENAI_API_KEY");
    output.newline();
    output.info("2. Start Qdrant (if not running):");
    output.command("docker run -p 6333:6333 -p 6334:6334 qdrant/qdrant");
    output.newline();
    output.info("3. Ingest documents and ask a question:");
    output.command("ragline ingest --dir ./docs");
    output.command("ragline ask \"What is machine learning?\"");

    output.hint("Switch [generation] provider to \"ollama\" to answer with a local model");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

/// Default configuration rendered as TOML under a short header.
fn generate_config_toml() -> Result<String, String> {
    let body = RagConfig::default().to_toml().map_err(|e| e.to_string())?;
    Ok(format!(
        "# ragline configuration\n\
         # API keys are read from the environment variables named by *_env keys.\n\
         # RUST_LOG overrides [logging].level when set.\n\n{}",
        body
    ))
}

fn generate_env_example() -> String {
    r#"# ragline environment variables
# Copy this file to .env and fill in the values.

# REQUIRED for the openai embedding and generation providers
OPENAI_API_KEY=sk-your-key-here

# Optional: overrides [logging].level (trace, debug, info, warn, error)
RUST_LOG=info,ragline=debug

# Optional: Qdrant API key, referenced by [vector_store].api_key_env
# QDRANT_API_KEY=your-key
"#
    .to_string()
}
