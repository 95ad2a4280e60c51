pub mod gemini_client;
#[cfg(test)]
pub mod scripted;

pub use gemini_client::GeminiLLMClient;
