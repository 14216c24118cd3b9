//! Prompt assembly for `generate_node`.
//!
//! The system persona, the citation rule, and the follow-up-question
//! requirement are part of the contract, not an implementation detail —
//! tests assert they appear verbatim in assembled prompts. Wording is
//! adapted from `langgraph_agent.py`'s system message
//! and `llm_handler.py`'s fallback-authority clause; the literal fallback
//! URL is recovered from the original source and kept as a configured
//! constant rather than hardcoded prose.

use lexrag_core::Message;

/// The Sri Lankan constitution PDF the generator is told to prefer when the
/// corpus has nothing relevant to cite.
pub const FALLBACK_AUTHORITY_URL: &str = "https://www.parliament.lk/files/pdf/constitution.pdf";

pub const SYSTEM_PERSONA: &str = "You are a legal research assistant for Sri Lankan jurisdictional \
documents (acts, bills, gazettes, and the constitution). Answer using only the provided context. \
After any sentence supported by a source document, cite it as [name]. If the provided context is \
insufficient to answer the question, say so plainly rather than guessing. When the corpus is silent \
on a point and a more authoritative general reference is appropriate, prefer citing the fallback \
authoritative reference before declining to answer. Adapt your register to the question — formal \
for statutory interpretation, plain for a general query. End every answer with a brief, inviting \
follow-up question.";

/// Assemble the message list sent to the LLM Gateway's `chat` operation:
/// system persona, citation list, target output language, prior session
/// messages, then the current turn's user message. The caller appends this
/// turn's user message to `prior_messages` before calling, matching the
/// session monotonicity invariant (stored length grows by exactly 2 on a
/// successful turn).
pub fn assemble_chat_messages(
    context: &str,
    citations: &[String],
    language: &str,
    prior_messages: &[Message],
    query: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(prior_messages.len() + 2);

    let mut system = String::new();
    system.push_str(SYSTEM_PERSONA);
    system.push_str(&format!("\n\nFallback authoritative reference: {FALLBACK_AUTHORITY_URL}"));
    system.push_str(&format!("\n\nTarget output language: {language}"));
    if citations.is_empty() {
        system.push_str("\n\nAvailable sources: none. Say so if asked for citations.");
    } else {
        system.push_str(&format!("\n\nAvailable sources: {}", citations.join(", ")));
    }
    if context.is_empty() {
        system.push_str("\n\nContext: (no relevant documents were retrieved)");
    } else {
        system.push_str(&format!("\n\nContext:\n{context}"));
    }
    messages.push(Message::system(system));

    messages.extend(prior_messages.iter().cloned());
    messages.push(Message::user(query.to_string()));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembled_system_message_carries_persona_citation_rule_and_fallback() {
        let messages = assemble_chat_messages("some context", &["doc1".into()], "en", &[], "what is the rule?");
        let system = &messages[0].content;
        assert!(system.contains(SYSTEM_PERSONA));
        assert!(system.contains(FALLBACK_AUTHORITY_URL));
        assert!(system.contains("Target output language: en"));
        assert!(system.contains("doc1"));
    }

    #[test]
    fn prior_messages_precede_the_current_query() {
        let prior = vec![Message::user("Q1"), Message::assistant("A1")];
        let messages = assemble_chat_messages("ctx", &[], "en", &prior, "Q2");
        assert_eq!(messages.len(), 4); // system + Q1 + A1 + Q2
        assert_eq!(messages[1].content, "Q1");
        assert_eq!(messages[2].content, "A1");
        assert_eq!(messages[3].content, "Q2");
    }
}
