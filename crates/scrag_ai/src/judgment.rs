//! Oracle calls that must come back as strict JSON.
//!
//! Every structured call site sends a prompt, decodes a fixed schema and, when either step
//! fails, substitutes a stage-specific default instead of surfacing an error.

use std::fmt;

use scrag_core::error::AppError;
use serde::de::DeserializeOwned;

use crate::llm::Llm;

#[derive(Debug)]
pub enum JudgmentError {
    /// The oracle call itself failed (transport, timeout, empty reply).
    Oracle(AppError),
    /// The reply was not valid JSON for the expected schema.
    Parse(serde_json::Error),
}

impl fmt::Display for JudgmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JudgmentError::Oracle(e) => write!(f, "oracle error: {e}"),
            JudgmentError::Parse(e) => write!(f, "JSON parsing error: {e}"),
        }
    }
}

impl std::error::Error for JudgmentError {}

/// Invoke the oracle and decode its reply as `S`. Surrounding whitespace is ignored;
/// anything else (markdown fences, prose) is a parse failure.
pub fn request_json<S: DeserializeOwned>(llm: &dyn Llm, prompt: &str) -> Result<S, JudgmentError> {
    let raw = llm.invoke(prompt).map_err(JudgmentError::Oracle)?;
    serde_json::from_str(raw.trim()).map_err(JudgmentError::Parse)
}

/// Structured judgment with a fallback: `accept` maps a decoded reply, `fallback` supplies
/// the stage default on any failure.
pub fn judge<S, T, A, F>(llm: &dyn Llm, prompt: &str, accept: A, fallback: F) -> T
where
    S: DeserializeOwned,
    A: FnOnce(S) -> T,
    F: FnOnce(JudgmentError) -> T,
{
    match request_json::<S>(llm, prompt) {
        Ok(reply) => accept(reply),
        Err(e) => fallback(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct Fixed(Result<&'static str, &'static str>);

    impl Llm for Fixed {
        fn invoke(&self, _prompt: &str) -> Result<String, AppError> {
            self.0
                .map(str::to_string)
                .map_err(|code| AppError::new(code, "boom"))
        }
    }

    #[derive(Debug, Deserialize)]
    struct Reply {
        n: i64,
    }

    fn run(llm: &Fixed) -> i64 {
        judge(llm, "p", |r: Reply| r.n, |_| -1)
    }

    #[test]
    fn decodes_json_with_surrounding_whitespace() {
        assert_eq!(run(&Fixed(Ok("\n  {\"n\": 4}  \n"))), 4);
    }

    #[test]
    fn markdown_fenced_json_takes_the_fallback() {
        assert_eq!(run(&Fixed(Ok("```json\n{\"n\": 4}\n```"))), -1);
    }

    #[test]
    fn oracle_error_takes_the_fallback() {
        assert_eq!(run(&Fixed(Err("AI_ORACLE_UNREACHABLE"))), -1);
        let err = request_json::<Reply>(&Fixed(Err("AI_ORACLE_UNREACHABLE")), "p").unwrap_err();
        assert!(matches!(err, JudgmentError::Oracle(ref e) if e.code == "AI_ORACLE_UNREACHABLE"));
    }

    #[test]
    fn wrong_schema_is_a_parse_error() {
        let err = request_json::<Reply>(&Fixed(Ok("{\"m\": 1}")), "p").unwrap_err();
        assert!(matches!(err, JudgmentError::Parse(_)));
        assert!(err.to_string().starts_with("JSON parsing error"));
    }
}
