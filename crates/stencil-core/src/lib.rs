//! Stencil Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Stencil decoder
//! and exporters. It includes:
//!
//! - **Geometry**: Shape position and size ([`geometry::Geometry`])
//! - **Kind**: The closed style classification of shapes ([`kind::ShapeKind`])
//! - **Model**: The decoded page graph ([`model::ShapeRecord`],
//!   [`model::ConnectionRecord`], [`model::PageGraph`], [`model::DocumentGraph`])

pub mod geometry;
pub mod kind;
pub mod model;

pub use geometry::Geometry;
pub use kind::ShapeKind;
pub use model::{ConnectionKind, ConnectionRecord, DocumentGraph, PageGraph, ShapeRecord};
