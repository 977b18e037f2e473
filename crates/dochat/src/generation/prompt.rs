//! Prompt assembly: instructional preamble and document context block

use crate::types::file::Chunk;

/// Fixed instructional preamble: assistant persona plus grounding rules
const SYSTEM_PREAMBLE: &str = "\
You are an AI assistant that helps users understand and analyze their documents.

Your task is to:
1. Answer questions based on the provided document content.
2. Provide clear, concise, and accurate responses.
3. Cite specific information from the documents when relevant.
4. If the answer is not in the documents, clearly state that.
5. Be helpful, professional, and easy to understand.

Important Rules:
- Always base your answers on the provided document content.
- Do not make up information that is not in the documents.
- If you're unsure, acknowledge the uncertainty.
- Keep responses focused and relevant to the user's question.
";

/// Prompt builder for document-grounded chat
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render chunks into a single bounded context block: header marker,
    /// chunk contents separated by blank lines, footer marker. Chunks must
    /// already be in file-creation then chunk-index order.
    pub fn build_context(chunks: &[Chunk]) -> String {
        let mut context = String::from("\n\n--- Document Content ---\n\n");

        for chunk in chunks {
            context.push_str(&chunk.content);
            context.push_str("\n\n");
        }

        context.push_str("--- End of Document Content ---\n");
        context
    }

    /// Full system instruction: preamble followed by the context block
    pub fn build_system_instruction(chunks: &[Chunk]) -> String {
        let mut instruction = String::from(SYSTEM_PREAMBLE);
        instruction.push_str(&Self::build_context(chunks));
        instruction
    }
}
