pub mod core;
pub mod generated;

// Re-export the main types for convenience
pub use self::core::PhraseSet;
pub use self::generated::generate_sentences;
