pub mod gemini;
pub mod normalize;
pub mod service;
pub mod shaper;

pub use gemini::GeminiBackend;
pub use service::LegalAssistant;
