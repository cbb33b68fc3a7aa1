//! Command-line tool for one-shot prompts against the chat service.
//!
//! This binary sends a prompt through a throwaway session and prints the
//! reply, using either plain text files or YAML run configurations.
//!
//! # Usage
//!
//! ```bash
//! # Run a text file as a prompt
//! achuan-prompt my_prompt.txt
//!
//! # Run a YAML configuration (name, model, prompt, files)
//! achuan-prompt run.yaml
//!
//! # Run multiple files and get JSON output
//! achuan-prompt --format json a.txt b.yaml
//!
//! # Include reasoning output and timing information
//! achuan-prompt --verbose --show-thinking my_prompt.txt
//! ```
//!
//! # File Types
//!
//! - **Text files** (`.txt` and anything else): treated as the prompt text
//! - **YAML files** (`.yaml`, `.yml`): run configurations

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use achuan::{Achuan, PromptRunConfig};

/// Output format for displaying run results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum OutputFormat {
    /// Plain text format (default) - human-readable output.
    #[default]
    Text,
    /// JSON format - structured output suitable for parsing.
    Json,
    /// YAML format - structured output in YAML format.
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Invalid output format: {}. Valid options: text, json, yaml",
                s
            )),
        }
    }
}

/// Command-line arguments for the achuan-prompt tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct Args {
    /// API token; falls back to the ACHUAN_TOKEN environment variable.
    #[arrrg(optional, "API token (default: ACHUAN_TOKEN env var)", "TOKEN")]
    token: Option<String>,

    /// Model for the throwaway session.
    #[arrrg(optional, "Model to use (default: gemini-3-pro-preview)", "MODEL")]
    model: Option<String>,

    /// Output format for results (text, json, yaml).
    #[arrrg(optional, "Output format: text, json, yaml", "FORMAT")]
    format: Option<String>,

    /// Include verbose output with timing and token usage information.
    #[arrrg(flag, "Include timing and token usage information")]
    verbose: bool,

    /// Print reasoning output before the answer.
    #[arrrg(flag, "Print reasoning output before the answer")]
    show_thinking: bool,
}

/// Main entry point for the achuan-prompt command-line tool.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, files) = Args::from_command_line_relaxed("achuan-prompt [OPTIONS] <FILES>...");

    if files.is_empty() {
        eprintln!("Error: Must specify at least one prompt file or config file");
        std::process::exit(1);
    }

    let client = Achuan::new(args.token)?;
    let output_format = if let Some(format_str) = args.format {
        format_str
            .parse()
            .map_err(|e| format!("Invalid format: {}", e))?
    } else {
        OutputFormat::Text
    };

    for (i, file_path) in files.iter().enumerate() {
        let mut config = if file_path.ends_with(".yaml") || file_path.ends_with(".yml") {
            // Load from YAML config file
            PromptRunConfig::from_file(file_path)?
        } else {
            // Treat as prompt text file - read directly
            let prompt_text = std::fs::read_to_string(file_path)?;
            PromptRunConfig::new(prompt_text).with_name(file_path.clone())
        };
        if config.model.is_none() {
            config.model = args.model.clone();
        }

        let result = config.run(&client).await?;

        match output_format {
            OutputFormat::Text => {
                if files.len() > 1 {
                    println!("=== {} ===", file_path);
                }

                if args.verbose {
                    if let Some(ref name) = result.config.name {
                        println!("Run: {}", name);
                    }
                    println!(
                        "Model: {}",
                        result.config.model.as_deref().unwrap_or("default")
                    );
                    println!("Duration: {:?}", result.duration);
                    println!("Tokens used: {}", result.tokens_used);
                    println!("---");
                }
                if args.show_thinking
                    && let Some(thinking) = &result.thinking
                {
                    println!("[thinking]\n{}\n", thinking);
                }
                println!("{}", result.answer);

                if files.len() > 1 && i < files.len() - 1 {
                    println!();
                }
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&result)?;
                println!("{}", json);
                if i < files.len() - 1 {
                    println!();
                }
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(&result)?;
                print!("{}", yaml);
                if i < files.len() - 1 {
                    println!("---");
                }
            }
        }
    }

    Ok(())
}
