//! Image generation: request payload, the service seam and the batch orchestrator.
//! Orchestrator drives units; the service talks to the server; observers render progress.

pub mod observer;
pub mod orchestrator;
pub mod request;
pub mod service;

pub use observer::{BatchEvent, BatchObserver, ObserverSet, TracingObserver};
pub use orchestrator::{BatchJob, BatchOrchestrator, BatchProgress, Summary, UnitError};
pub use request::{load_reference_images, GenerationRequest, MAX_REFERENCE_IMAGES};
pub use service::{
    translate_if_present, GenerationOutput, GenerationService, HttpGenerationService,
    NO_TEXT_OUTPUT,
};
