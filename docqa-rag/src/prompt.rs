//! Grounded prompt assembly.
//!
//! Retrieved context is joined in retrieval order (descending similarity)
//! because earlier-listed evidence is implicitly weighted more salient by
//! instruction-following models, then embedded in a fixed answer template.

use crate::document::RetrievedDocument;

/// The fixed answer when no grounding context is available.
///
/// This is a contract string, not a suggestion: the answering pipeline
/// returns it directly when retrieval is empty, and the prompt template
/// instructs the model to emit the same bytes when the supplied context is
/// insufficient. Both paths must stay byte-identical.
pub const FALLBACK_ANSWER: &str = "I do not have enough information on this";

/// Render the fixed instruction template around the question and its
/// grounding context.
///
/// Context document texts are joined with a blank-line separator in the
/// order received from the retriever.
pub fn assemble_prompt(user_prompt: &str, context: &[RetrievedDocument]) -> String {
    let context_text =
        context.iter().map(|doc| doc.text.as_str()).collect::<Vec<_>>().join("\n\n");

    format!(
        "You are an AI research assistant.\n\
         \n\
         Answer the question strictly using the provided context below.\n\
         If the answer is not present in the context, say:\n\
         \"{FALLBACK_ANSWER}\"\n\
         \n\
         Context:\n\
         {context_text}\n\
         \n\
         Question:\n\
         {user_prompt}\n\
         \n\
         Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkMetadata;

    fn doc(text: &str, chunk_index: usize) -> RetrievedDocument {
        RetrievedDocument {
            text: text.to_string(),
            metadata: ChunkMetadata {
                user_id: "u1".to_string(),
                source: "doc.pdf".to_string(),
                page: 1,
                chunk_index,
            },
            score: 1.0,
        }
    }

    #[test]
    fn joins_context_in_retrieval_order() {
        let prompt = assemble_prompt(
            "what happened first?",
            &[doc("most relevant", 0), doc("less relevant", 1)],
        );
        assert!(prompt.contains("most relevant\n\nless relevant"));
        let first = prompt.find("most relevant").unwrap();
        let second = prompt.find("less relevant").unwrap();
        assert!(first < second);
    }

    #[test]
    fn template_quotes_the_fallback_contract_string() {
        let prompt = assemble_prompt("q", &[doc("ctx", 0)]);
        assert!(prompt.contains(&format!("\"{FALLBACK_ANSWER}\"")));
        assert!(prompt.contains("Question:\nq"));
        assert!(prompt.ends_with("Answer:"));
    }
}
