use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("record {name:?} has level {level}, expected a level between 1 and 6")]
    LevelOutOfRange { name: String, level: i64 },
}

pub type BuildResult<T> = Result<T, BuildError>;
