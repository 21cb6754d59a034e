//! Storage abstractions for service layer
//!
//! Contains the file-backed document store shared by services that persist
//! a single JSON document.

pub mod json_document_store;
