//! The `sumbench init` command.

use std::path::Path;

use anyhow::Result;

/// Write `content` to `path` unless it already exists.
fn write_once(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

pub fn execute() -> Result<()> {
    write_once(Path::new("sumbench.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("tasks")?;
    write_once(Path::new("tasks/example.toml"), EXAMPLE_TASK)?;
    write_once(Path::new("tasks/article.md"), EXAMPLE_ARTICLE)?;

    println!("\nNext steps:");
    println!("  1. Put GROQ_API_KEY (and optionally ANTHROPIC_API_KEY) in .env");
    println!("  2. Run: sumbench summarize --task tasks/example.toml");
    println!("  3. Run: sumbench analyze --task tasks/example.toml --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# sumbench configuration

default_provider = "groq"
default_model = "llama3-8b-8192"
default_temperature = 0.0
max_tokens = 1024
parallelism = 4
output_dir = "./sumbench-results"

[providers.groq]
type = "groq"
api_key = "${GROQ_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.mock]
type = "mock"
"#;

const EXAMPLE_TASK: &str = r#"[task]
id = "example"
name = "Example market report"
description = "Summarize a short market report in three numbered points"
article = "article.md"
key_elements = ["Berlin", "2023", "rents", "vacancy"]
source_facts = ["rents rose 6 percent", "vacancy fell to 1.2 percent"]

[task.constraints]
min_words = 40
max_words = 90
structure_markers = ["1.", "2.", "3."]

[[summaries]]
model = "Llama3-8B"
path = "../sumbench-results/llama3-8b_result.json"
provider = "groq"
provider_model = "llama3-8b-8192"

[[summaries]]
model = "Claude 3.5 Haiku"
path = "../sumbench-results/claude_3.5_haiku_result.json"
provider = "anthropic"
provider_model = "claude-3-5-haiku-20241022"
"#;

const EXAMPLE_ARTICLE: &str = "# Berlin Housing Market 2023\n\n\
Residential rents in Berlin rose 6 percent in 2023, the fastest increase in a decade. \
Vacancy fell to 1.2 percent as construction of new flats slowed and household numbers grew.\n\n\
Analysts expect rents to keep rising while interest rates stay high, \
because fewer projects reach financing. \
The city plans to speed up permits for modular housing in 2024.\n";
