/*!
 * Client for the local Ollama inference endpoint.
 *
 * This module contains everything that talks to the backend:
 * - `client`: request/response types and the retrying translation client
 * - `service`: lifecycle management for the local `ollama` daemon
 */

pub use self::client::{backoff_delay, GenerationRequest, GenerationResponse, OllamaClient};
pub use self::service::{ServiceManager, ServiceStatus};

pub mod client;
pub mod service;
