pub mod config;
pub mod core;
pub mod data;
pub mod domain;
pub mod repl;
pub mod scraper;
pub mod search;
pub mod tutor;
pub mod utils;
pub mod visual;

#[cfg(feature = "cli")]
pub use config::{BuildArgs, Cli, Command};

pub use config::{LocalStorage, TomlConfig};
pub use core::{etl::BuildEngine, pipeline::GraphPipeline};
pub use scraper::HybridDescriber;
pub use search::KnowledgeGraphSearch;
pub use tutor::DsaTutorEngine;
pub use utils::error::{KgError, Result};
