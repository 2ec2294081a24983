//! # multipost
//!
//! Dispatches one media file to multiple external publishing destinations,
//! either through a documented API or by driving a real browser session the
//! way a person would use the upload form.
//!
//! ## Architecture
//!
//! Strict layering, leaf-first:
//!
//! ### ① Infrastructure
//! - `browser/` - profile store and the shared session registry
//!   (chromiumoxide, one live session per profile name)
//! - `infrastructure/` - `PageDriver`, the only owner of page-level
//!   capabilities (eval, find, click, type, file injection)
//!
//! ### ② Workflow
//! - `workflow/` - condition-wait primitives: bounded polling, locator
//!   fallback, the login URL round-trip, the publish wait
//!
//! ### ③ Destinations
//! - `destinations/` - one interaction state machine per browser-driven
//!   destination plus the API-based ones, behind a uniform handler contract
//!
//! ### ④ Orchestration
//! - `orchestrator/` - the dispatcher: resolves keys, invokes handlers in
//!   caller order, aggregates partial failures into a `BatchResult`

pub mod browser;
pub mod config;
pub mod destinations;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod utils;
pub mod workflow;

pub use browser::{ProfileStore, SessionManager};
pub use config::Config;
pub use destinations::{DestinationHandler, HandlerFactory};
pub use error::{AppError, AppResult};
pub use infrastructure::PageDriver;
pub use models::{BatchResult, DestinationRegistry, UploadOutcome, UploadRequest};
pub use orchestrator::Dispatcher;
