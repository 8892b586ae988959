//! # burndown-gateway
//!
//! Webhook ingestion and historical burndown reconstruction gateway for
//! tracked code-review changesets.
//!
//! The gateway authenticates inbound code-host deliveries against
//! configured webhook secrets, translates them into normalized changeset
//! events, persists them idempotently, and reconstructs exact daily
//! aggregate counts of changeset states from the stored event log.
//!
//! ## Architecture
//!
//! ```text
//! Code host (webhook POST)                Reporting clients
//!     │                                       │
//!     ├── Webhook Handler (api/)              ├── Counts Handler (api/)
//!     │                                       │
//!     ├── WebhookService (service/)           ├── CountsService (service/)
//!     │     signature verify (webhook/)       │     calc_counts (domain/)
//!     │     payload translate (webhook/)      │
//!     │                                       │
//!     └── Store (persistence/) ───────────────┘
//!           PostgreSQL | in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod webhook;
