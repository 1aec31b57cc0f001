pub mod error;
pub mod evaluation;
pub mod firecrawl;
pub mod gemini;

pub use error::JudgeError;
pub use evaluation::{evaluate, EvaluationResult, Evaluator, JudgeId, Verdict};
pub use firecrawl::{fetch_content, FirecrawlClient, FirecrawlConfig};
pub use gemini::{GeminiClient, GeminiConfig};
