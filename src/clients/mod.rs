pub mod finnhub;
pub mod gemini;
pub mod llm;
pub mod openai;
