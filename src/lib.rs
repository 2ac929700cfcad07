/*!
 * # subreview - spreadsheet translation review with AI
 *
 * Reviews first-pass Japanese translations of spoken English transcripts
 * that live in spreadsheet documents, using a chat completion service.
 *
 * ## Features
 *
 * - Colour-flagged row selection (rows marked with a white background)
 * - Context-aware review: each line is sent with its neighbours
 * - One consolidated completion request per document, with timeout and retry
 * - Tolerant line-grammar parsing of the completion
 * - One bulk write of revised translation, error category and explanation
 * - Multi-document runs driven by a master index, isolating failures
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `sheet`: Spreadsheet abstraction:
 *   - `sheet::google`: Google Sheets REST client
 *   - `sheet::memory`: In-memory documents for tests and experiments
 * - `review`: The review pipeline:
 *   - `review::eligibility`: Colour-based row selection
 *   - `review::context`: Neighbouring lines
 *   - `review::prompt`: Prompt construction
 *   - `review::completion`: Completion requests with timeout and retry
 *   - `review::parser`: Completion parsing
 *   - `review::update`: Write planning and the bulk write
 *   - `review::pipeline`: One document end to end
 * - `providers`: Client implementations for the completion services:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted provider for tests
 * - `app_controller`: Multi-document driver
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod providers;
pub mod review;
pub mod sheet;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use errors::{AppError, ProviderError, ReviewError, SheetError};
pub use review::{ColorPolicy, FormatStrategy, ReviewPipeline, ReviewReport};
