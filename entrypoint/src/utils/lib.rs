pub mod errors;
pub mod logger;
pub mod pipeline;
pub mod streams;
