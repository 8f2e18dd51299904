use scrag_core::domain::Passage;

/// Evidence block shared by generation and fact checking: `[Source N]` is 1-based.
pub fn source_context(passages: &[&Passage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("[Source {}] ({})\n{}", i + 1, p.source, p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn relevance_prompt(subject: &str, question: &str, excerpt: &str) -> String {
    format!(
        r#"You are a document relevance evaluator for {subject} queries.

USER QUESTION: {question}

DOCUMENT EXCERPT:
{excerpt}

TASK: Rate how relevant this document is for answering the user's question.
Consider: Does it contain information that directly addresses the question?

Respond ONLY with valid JSON (no markdown):
{{"relevance_score": <1-10>, "reason": "<brief explanation>"}}"#
    )
}

pub fn answer_prompt(subject: &str, question: &str, context: &str) -> String {
    // Contract:
    // - Use ONLY the reference documents.
    // - Cite as [Source N].
    // - Say what is missing instead of inventing it.
    format!(
        r#"You are an expert {subject} consultant.

REFERENCE DOCUMENTS:
{context}

USER QUESTION: {question}

INSTRUCTIONS:
1. Answer using ONLY information from the reference documents above
2. Cite sources by referencing [Source 1], [Source 2], etc.
3. If information is insufficient, explicitly state what's missing
4. Be precise and specific - this is for compliance purposes
5. Structure your answer clearly

ANSWER:"#
    )
}

pub fn fact_check_prompt(subject: &str, question: &str, answer: &str, context: &str) -> String {
    format!(
        r#"You are a fact-checking expert specializing in {subject} content.

SOURCE DOCUMENTS:
{context}

GENERATED ANSWER:
{answer}

ORIGINAL QUESTION: {question}

TASK: Verify factual consistency between the answer and source documents.

Instructions:
1. Identify key factual claims in the answer
2. Check if each claim is supported by the source documents
3. Note any claims that are unsupported or potentially hallucinated
4. Assign an overall consistency score (0-100%)

Respond ONLY with valid JSON (no markdown):
{{
  "consistency_score": <0-100>,
  "supported_claims": ["claim1", "claim2"],
  "unsupported_claims": ["claim1"],
  "verdict": "<brief overall assessment>"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_labels_are_one_based_and_ordered() {
        let a = Passage {
            id: "a".to_string(),
            source: "act.txt".to_string(),
            text: "alpha".to_string(),
        };
        let b = Passage {
            id: "b".to_string(),
            source: "gdpr.txt".to_string(),
            text: "beta".to_string(),
        };
        let ctx = source_context(&[&a, &b]);
        assert_eq!(ctx, "[Source 1] (act.txt)\nalpha\n\n[Source 2] (gdpr.txt)\nbeta");
    }

    #[test]
    fn json_schemas_survive_formatting() {
        let p = relevance_prompt("law", "q?", "text");
        assert!(p.contains(r#"{"relevance_score": <1-10>, "reason": "<brief explanation>"}"#));
        let p = fact_check_prompt("law", "q?", "ans", "ctx");
        assert!(p.contains(r#""consistency_score": <0-100>,"#));
    }
}
