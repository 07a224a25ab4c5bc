//! Structured logging and optional OpenTelemetry export.
//!
//! Logs are JSON on stdout, filtered by `RUST_LOG` or the configured
//! `LOG_LEVEL`. When an OTLP endpoint is configured, the same spans are also
//! exported over OTLP/gRPC to a collector.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, ciphertext, token, or key material** must appear in any
//!   span attribute or log field. Storage keys are the only per-secret
//!   identifier that may be logged.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
