//! Board use-case services.
//!
//! # Responsibility
//! - Orchestrate layout, gestures and persistence into board operations.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod board_service;
pub mod links;
