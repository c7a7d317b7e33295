//! Context packing and the fixed prompts sent to the chat model

use crate::types::{tag_for, Chunk};

pub const SYSTEM_PROMPT: &str = "You are a reading assistant for students.\n\
Rules:\n\
1) Use ONLY the provided context to answer.\n\
2) If the context does not contain the answer, say you don't have enough information.\n\
3) Always include citations like [C1], [C2] next to the claims they support.\n\
4) Keep the answer concise for a demo.\n";

/// Pack chunks into one tagged line each: `[C<i> | <title> p.<page>] <text>`
pub fn build_context(chunks: &[Chunk]) -> String {
  chunks
    .iter()
    .enumerate()
    .map(|(i, chunk)| {
      let page = chunk.page.as_deref().unwrap_or("?");
      format!("[{} | {} p.{}] {}", tag_for(i), chunk.title, page, flatten(&chunk.text))
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// User turn embedding the context block and the question verbatim
pub fn user_message(question: &str, context: &str) -> String {
  format!("CONTEXT:\n{context}\n\nQUESTION:\n{question}\n\nAnswer with citations.")
}

fn flatten(text: &str) -> String {
  text.trim().replace("\r\n", " ").replace('\n', " ")
}
