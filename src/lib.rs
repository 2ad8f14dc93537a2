pub mod checker;
pub mod config;
pub mod envelope;
pub mod error;
pub mod generator;
pub mod php;
pub mod registry;
pub mod scanner;
pub mod syntax;
pub mod transform;
pub mod tree;
pub mod ts_generator;
pub mod writer;

pub use config::Config;
pub use error::{Error, Result};
pub use generator::{EnumRequest, Generator, TranslationRequest, TranslatorRequest};
