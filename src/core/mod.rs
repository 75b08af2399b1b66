pub mod etl;
pub mod export;
pub mod pipeline;
pub mod relations;

pub use crate::domain::model::{
    BaseConcept, BuildReport, BuildResult, ConceptNode, DescriptionOrigin, KnowledgeGraph,
};
pub use crate::domain::ports::{ConfigProvider, Describer, Pipeline, Storage};
pub use crate::utils::error::Result;
