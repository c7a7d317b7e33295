use super::prompt::{build_context, user_message, SYSTEM_PROMPT};
use crate::error::Result;
use crate::services::ChatModel;
use crate::types::{ChatResponse, Chunk, Citation};

/// Ask the chat model to answer from the chunks and attach citations.
///
/// Upstream failures propagate; no fallback answer is produced.
pub async fn answer(chat: &dyn ChatModel, question: &str, chunks: &[Chunk]) -> Result<ChatResponse> {
  let context = build_context(chunks);
  let answer = chat.complete(SYSTEM_PROMPT, &user_message(question, &context)).await?;

  Ok(ChatResponse { answer, citations: citations_for(chunks) })
}

/// One citation per chunk, in chunk order, whether or not the answer cites it
pub fn citations_for(chunks: &[Chunk]) -> Vec<Citation> {
  chunks.iter().enumerate().map(|(i, chunk)| Citation::for_chunk(i, chunk)).collect()
}
