//! Canonical document state
//!
//! The single authoritative copy of the report being edited. Every stage,
//! the derived-artifact pipeline, and the exporter read and write this one
//! aggregate; no component holds a separate mutable copy of any field.
//!
//! Each durable field is a [`reportsmith_store::PersistentField`]
//! (write-behind persistence); the chart raster is in-memory only, cheap to
//! regenerate and expensive to serialize.

pub mod document;

pub use document::DocumentState;
