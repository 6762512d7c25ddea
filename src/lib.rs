/*!
 * # doctrans - Document Translation with a local LLM
 *
 * A Rust library for translating long UTF-8 documents with a local
 * Ollama inference endpoint.
 *
 * ## Features
 *
 * - Split documents into token-bounded slices at paragraph and sentence
 *   boundaries, preserving blank-line structure on round-trip
 * - Batch short paragraphs into one request via a separator sentinel
 * - Resilient request client with exponential backoff and typed failure
 *   classification
 * - Incremental, strictly ordered output writing with progress reporting
 * - Optional lifecycle management of the local `ollama` daemon
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `slicer`: Token-bounded text slicing and regrouping
 * - `ollama`: Backend client and service management:
 *   - `ollama::client`: Generate-endpoint client with retry/backoff
 *   - `ollama::service`: Start/stop/restart/status of the local daemon
 * - `pipeline`: Pipeline orchestrator driving slicer output through the client
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod file_utils;
pub mod ollama;
pub mod pipeline;
pub mod slicer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ClientError, PipelineError, ServiceError};
pub use ollama::{OllamaClient, ServiceManager};
pub use pipeline::TranslationPipeline;
pub use slicer::{SliceGroup, TextSlicer};
