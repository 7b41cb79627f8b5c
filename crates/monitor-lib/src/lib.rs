//! Core library for the PharmaMind line monitor
//!
//! This crate provides the core functionality for:
//! - Typed access to the manufacturing backend
//! - Keyed polling on per-view cadences
//! - OEE, maintenance, quality and analytics derivation
//! - Line selection with stale-response reconciliation
//! - Health checks and observability

pub mod derive;
pub mod gateway;
pub mod health;
pub mod labels;
pub mod models;
pub mod observability;
pub mod poller;
pub mod reconcile;
pub mod views;

pub use gateway::{GatewayClient, GatewayConfig, GatewayError, LineDataSource};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{MonitorMetrics, StructuredLogger};
pub use reconcile::{ApplyOutcome, Selection, SelectionError, SharedView, ViewState};
pub use views::{Monitor, MonitorOptions, ViewContext, ViewKind};
