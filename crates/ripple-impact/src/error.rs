//! Impact analysis errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("node {0} is not in the graph")]
    NodeNotFound(String),
}

pub type Result<T> = std::result::Result<T, ImpactError>;
