pub mod base;
pub mod completion;
pub mod embeddings;
pub mod synthesis;
pub mod transcription;
