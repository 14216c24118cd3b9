//! The compiled state graph's node identities and conditional entry.
//!
//! Grounded on `Backend/services/langgraph_agent.py`'s `StateGraph` (three
//! nodes, one conditional edge) re-expressed per the redesign note as an
//! explicit enum rather than a third-party graph library.

use lexrag_core::AgentFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Translate,
    Retrieve,
    Generate,
    End,
}

/// Conditional entry: non-English frames enter at `Translate`, English
/// frames skip straight to `Retrieve`.
pub fn should_translate(frame: &AgentFrame) -> Stage {
    if frame.language != "en" {
        Stage::Translate
    } else {
        Stage::Retrieve
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_english_enters_at_translate() {
        let frame = AgentFrame::new("q", "si");
        assert_eq!(should_translate(&frame), Stage::Translate);
    }

    #[test]
    fn english_enters_at_retrieve() {
        let frame = AgentFrame::new("q", "en");
        assert_eq!(should_translate(&frame), Stage::Retrieve);
    }
}
