//! The grounding prompt sent to the completion backend.
//!
//! Grounding is enforced only here, by instruction: the service never checks
//! that an answer actually comes from the context. Keeping the template in one
//! place lets tests assert on its exact shape without a live backend.

/// Sentence the model is told to reply with when the context lacks the answer.
pub const NOT_IN_CONTEXT_ANSWER: &str = "Answer is not available in the context.";

/// Prompt template. `{context}` and `{question}` are substituted verbatim by
/// [`build_prompt`].
pub const GROUNDED_ANSWER_TEMPLATE: &str = r#"
Answer the question as accurately as possible based on the provided context.
If the answer is not in the context, respond with: "Answer is not available in the context."

Context:
{context}

Question:
{question}

Answer:
"#;

/// Substitute `context` and `question` into [`GROUNDED_ANSWER_TEMPLATE`].
///
/// The substitution is single-pass: braces inside the context (code, JSON,
/// LaTeX) are copied as-is and never re-interpreted as placeholders. No
/// truncation is applied; the full corpus always goes out.
pub fn build_prompt(context: &str, question: &str) -> String {
    let mut out = String::with_capacity(
        GROUNDED_ANSWER_TEMPLATE.len() + context.len() + question.len(),
    );
    let mut rest = GROUNDED_ANSWER_TEMPLATE;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{context}") {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{question}") {
            out.push_str(question);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
