use judge_common::JudgeError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error("config error: {0}")]
    Config(String),

    #[error("missing API key: pass {param} or set {env_var}")]
    MissingApiKey {
        param: &'static str,
        env_var: &'static str,
    },

    #[error("{0} must not be empty")]
    EmptyArgument(&'static str),
}
