/*!
 * Pipeline orchestrator for document translation.
 *
 * Drives the slicer output group by group, in original order, translating
 * each unit through the client and writing output incrementally. One group
 * is fully translated and written before the next begins; there are no
 * concurrent in-flight requests.
 */

use log::info;
use std::io::Write;

use crate::errors::PipelineError;
use crate::ollama::OllamaClient;
use crate::slicer::{SliceGroup, TextSlicer};

/// How much of a failing slice is quoted in the error
const FAILURE_PREVIEW_CHARS: usize = 100;

/// Orchestrates slicing, translation and reassembly of one document
pub struct TranslationPipeline {
    /// Client used for every model call
    client: OllamaClient,
    /// Slicer holding the token budget and separator sentinel
    slicer: TextSlicer,
    /// Resolved system instruction sent with every request
    system_prompt: String,
}

impl TranslationPipeline {
    /// Create a pipeline from its collaborators
    pub fn new(client: OllamaClient, slicer: TextSlicer, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            slicer,
            system_prompt: system_prompt.into(),
        }
    }

    /// Translate a whole document, writing output incrementally.
    ///
    /// The progress callback receives `(processed_so_far, total)` before each
    /// slice is handled and a final `(total, total)` after the last one; an
    /// empty document produces no callbacks and an empty output.
    ///
    /// The first unrecovered translation failure aborts the run; output
    /// written so far stays in the sink.
    pub async fn run<W, F>(
        &self,
        text: &str,
        output: &mut W,
        mut progress: F,
    ) -> Result<(), PipelineError>
    where
        W: Write,
        F: FnMut(usize, usize),
    {
        let groups = self.slicer.process(text);
        let total = groups.len();
        info!("Generated {} slices", total);

        let mut index = 0;
        while index < total {
            progress(index, total);

            match &groups[index] {
                SliceGroup::Empty => {
                    output.write_all(b"\n\n")?;
                    index += 1;
                }

                SliceGroup::Normal(paragraphs) => {
                    let joined = self.slicer.join_with_separator(paragraphs);
                    let translated = self.translate_slice(&joined).await?;

                    for paragraph in self.slicer.split_by_separator(&translated) {
                        output.write_all(paragraph.as_bytes())?;
                        output.write_all(b"\n\n")?;
                    }
                    index += 1;
                }

                SliceGroup::LongParagraphSlice { paragraph, text } => {
                    // Sub-slices of one paragraph are translated one by one
                    // and rejoined into a single block with no separator.
                    let paragraph = *paragraph;
                    let mut translated = self.translate_slice(text).await?;
                    index += 1;

                    while index < total {
                        match &groups[index] {
                            SliceGroup::LongParagraphSlice { paragraph: next, text }
                                if *next == paragraph =>
                            {
                                progress(index, total);
                                translated.push_str(&self.translate_slice(text).await?);
                                index += 1;
                            }
                            _ => break,
                        }
                    }

                    output.write_all(translated.trim().as_bytes())?;
                    output.write_all(b"\n\n")?;
                }
            }

            // Keep completed groups on disk even if a later slice fails.
            output.flush()?;
        }

        if total > 0 {
            progress(total, total);
        }

        output.flush()?;
        Ok(())
    }

    /// Translate one slice, attaching a content preview on failure
    async fn translate_slice(&self, text: &str) -> Result<String, PipelineError> {
        self.client
            .translate(text, &self.system_prompt, None)
            .await
            .map_err(|source| PipelineError::SliceFailed {
                preview: failure_preview(text),
                source,
            })
    }
}

/// Truncate slice content for inclusion in an error message
fn failure_preview(text: &str) -> String {
    text.chars().take(FAILURE_PREVIEW_CHARS).collect()
}
