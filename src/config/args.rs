use crate::config::toml_config::{DEFAULT_ARCHIVE_NAME, DEFAULT_GRAPH_FILE, DEFAULT_OUTPUT_PATH};
use crate::core::export::EXPORT_FORMATS;
use crate::core::ConfigProvider;
use crate::domain::settings::{
    LlmSettings, ScraperSettings, DEFAULT_LLM_ENDPOINT, DEFAULT_LLM_MODEL,
    DEFAULT_MAX_DESCRIPTION_LENGTH, DEFAULT_REQUEST_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SCRAPE_BASE_URL,
};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "dsa-kg")]
#[command(about = "Build, search and explain a Data Structures & Algorithms knowledge graph")]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the knowledge graph and save it as JSON
    Build(BuildArgs),
    /// Run the exact, fuzzy, relation and keyword searches for a query
    Search {
        query: String,
        #[command(flatten)]
        graph: GraphFileArgs,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Answer a question such as "Explain stack" from the graph
    Ask {
        question: String,
        #[command(flatten)]
        graph: GraphFileArgs,
        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the neighborhood of a concept (or the whole overview)
    Graph(GraphArgs),
    /// Print graph statistics
    Stats {
        #[command(flatten)]
        graph: GraphFileArgs,
    },
    /// Interactive search prompt
    Repl {
        #[command(flatten)]
        graph: GraphFileArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct GraphFileArgs {
    /// Knowledge graph JSON file (searched in the usual locations when omitted)
    #[arg(long = "graph")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Html,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct GraphArgs {
    /// Concept key or name to center on
    #[arg(required_unless_present = "overview")]
    pub concept: Option<String>,

    /// Render the global overview instead of one neighborhood
    #[arg(long, conflicts_with = "concept")]
    pub overview: bool,

    #[command(flatten)]
    pub graph: GraphFileArgs,

    /// Output file (stdout when omitted)
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "html")]
    pub format: RenderFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct BuildArgs {
    /// TOML configuration file; its settings replace the flags below
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long = "out", default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_GRAPH_FILE)]
    pub graph_file: String,

    /// Disable web scraping and LLM enrichment
    #[arg(long)]
    pub fast: bool,

    /// TOML file with [[concept]] seed entries
    #[arg(long)]
    pub seeds: Option<String>,

    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub export: Vec<String>,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive: String,

    /// Log CPU and memory usage per stage
    #[arg(long)]
    pub monitor: bool,

    #[arg(long)]
    pub no_scrape: bool,

    #[arg(long)]
    pub no_llm: bool,

    #[arg(long, default_value = DEFAULT_SCRAPE_BASE_URL)]
    pub scrape_base: String,

    #[arg(long, default_value = DEFAULT_LLM_ENDPOINT)]
    pub llm_endpoint: String,

    #[arg(long, default_value = DEFAULT_LLM_MODEL)]
    pub llm_model: String,

    #[arg(long, default_value_t = DEFAULT_MAX_DESCRIPTION_LENGTH)]
    pub max_length: usize,

    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_REQUEST_DELAY_MS)]
    pub delay_ms: u64,
}

impl ConfigProvider for BuildArgs {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn graph_file_name(&self) -> &str {
        &self.graph_file
    }

    fn enrich(&self) -> bool {
        !self.fast
    }

    fn seed_file(&self) -> Option<&str> {
        self.seeds.as_deref()
    }

    fn export_formats(&self) -> &[String] {
        &self.export
    }

    fn export_archive_name(&self) -> &str {
        &self.archive
    }

    fn scraper_settings(&self) -> ScraperSettings {
        ScraperSettings {
            enabled: !self.no_scrape,
            base_url: self.scrape_base.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            request_delay: Duration::from_millis(self.delay_ms),
            max_length: self.max_length,
            ..Default::default()
        }
    }

    fn llm_settings(&self) -> Option<LlmSettings> {
        if self.no_llm {
            return None;
        }
        Some(LlmSettings {
            endpoint: self.llm_endpoint.clone(),
            model: self.llm_model.clone(),
            max_length: self.max_length,
            ..Default::default()
        })
    }
}

impl Validate for BuildArgs {
    fn validate(&self) -> Result<()> {
        validation::validate_path("--out", &self.output_path)?;
        validation::validate_path("--graph-file", &self.graph_file)?;
        if let Some(seeds) = &self.seeds {
            validation::validate_path("--seeds", seeds)?;
        }
        validation::validate_allowed_values("--export", &self.export, &EXPORT_FORMATS)?;
        validation::validate_path("--archive", &self.archive)?;
        validation::validate_positive_number("--max-length", self.max_length, 1)?;
        validation::validate_range("--timeout-secs", self.timeout_secs, 1, 120)?;

        if !self.no_scrape {
            validation::validate_url("--scrape-base", &self.scrape_base)?;
        }
        if !self.no_llm {
            validation::validate_url("--llm-endpoint", &self.llm_endpoint)?;
            validation::validate_non_empty_string("--llm-model", &self.llm_model)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dsa-kg").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_build_defaults() {
        let cli = parse(&["build"]);
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };

        assert_eq!(args.output_path(), ".");
        assert_eq!(args.graph_file_name(), "data/knowledge_graph.json");
        assert!(args.enrich());
        assert_eq!(args.export_formats(), &["json".to_string()]);
        assert_eq!(args.scraper_settings().timeout, Duration::from_secs(6));
        assert_eq!(args.llm_settings().unwrap().model, "phi3");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_build_flags() {
        let cli = parse(&[
            "--verbose", "build", "--fast", "--no-llm", "--export", "csv,tsv", "--out", "/tmp/kg",
        ]);
        assert!(cli.verbose);
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };

        assert!(!args.enrich());
        assert!(args.llm_settings().is_none());
        assert_eq!(args.export_formats(), &["csv".to_string(), "tsv".to_string()]);
        assert_eq!(args.output_path(), "/tmp/kg");
    }

    #[test]
    fn test_build_validation_rejects_bad_values() {
        let cli = parse(&["build", "--export", "xml"]);
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert!(args.validate().is_err());

        let cli = parse(&["build", "--llm-endpoint", "localhost"]);
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_graph_command_requires_concept_or_overview() {
        assert!(Cli::try_parse_from(["dsa-kg", "graph"]).is_err());

        let cli = parse(&["graph", "--overview", "--format", "json"]);
        let Command::Graph(args) = cli.command else {
            panic!("expected graph command");
        };
        assert!(args.overview);
        assert_eq!(args.format, RenderFormat::Json);

        let cli = parse(&["graph", "stack", "--graph", "kg.json"]);
        let Command::Graph(args) = cli.command else {
            panic!("expected graph command");
        };
        assert_eq!(args.concept.as_deref(), Some("stack"));
        assert_eq!(args.graph.path, Some(PathBuf::from("kg.json")));
    }
}
