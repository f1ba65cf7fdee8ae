//! # invoice-extract
//!
//! The optional natural-language autofill collaborator for `invoice-core`.
//!
//! A free-text order description ("3 guests had paneer tikka and butter
//! naan") goes to an OpenAI-compatible chat endpoint behind the narrow
//! [`OrderExtractor`] trait and comes back as an [`ExtractedInvoice`]:
//! partial business/staff fields plus structured line items. The caller
//! merges only the fields actually returned into its own [`FormState`]
//! and hands the resulting `InvoiceData` to the core — the renderer never
//! depends on this crate, on the network, or on the model's determinism.
//!
//! Failures (missing key, transport errors, non-JSON responses) surface
//! verbatim as [`ExtractError`]; nothing silently degrades to empty data.

mod client;
mod form;

pub use client::{
    BusinessPatch, ChatExtractor, ExtractError, ExtractedInvoice, ExtractedItem, OrderExtractor,
    StaffPatch,
};
pub use form::FormState;
