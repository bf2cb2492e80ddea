// Process-wide configuration, loaded once from the environment.

use std::env;

// Use lazy_static to initialize static variables safely.
lazy_static::lazy_static! {
    pub static ref OLLAMA_URL: String = env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
    pub static ref OLLAMA_MODEL: String = env::var("OLLAMA_MODEL").unwrap_or_else(|_| "dolphin-mistral:7b".to_string());

    // Cloud credentials. Gemini is the one hard requirement (checked at startup);
    // any other key left unset just disables its adapter.
    pub static ref GEMINI_API_KEY: String = env::var("GEMINI_API_KEY").unwrap_or_default();
    pub static ref HUGGINGFACE_API_TOKEN: String = env::var("HUGGINGFACE_API_TOKEN").unwrap_or_default();
    pub static ref GROQ_API_KEY: String = env::var("GROQ_API_KEY").unwrap_or_default();
    pub static ref COHERE_API_KEY: String = env::var("COHERE_API_KEY").unwrap_or_default();
}

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

pub const HUGGINGFACE_API_BASE: &str = "https://api-inference.huggingface.co";
pub const HUGGINGFACE_DEFAULT_MODEL: &str = "gpt2";

pub const GROQ_API_BASE: &str = "https://api.groq.com";
pub const GROQ_MODEL: &str = "llama3-8b-8192";

pub const COHERE_API_BASE: &str = "https://api.cohere.com";
pub const COHERE_MODEL: &str = "command-r";
