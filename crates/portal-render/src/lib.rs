#![forbid(unsafe_code)]

//! Page model and diffing.
//!
//! `portal-render` keeps an in-memory model of the page anchors the engine
//! binds to ([`page::Page`]) and computes the minimal set of
//! [`diff::DomPatch`]es the host applies to the real document.
//!
//! # Role
//! Models never touch the DOM. `Model::view` writes into a fresh
//! [`page::Page`] instantiated from [`page::PageMarkup`]; the runner diffs it
//! against the previous page and hands patches to the host. Anchors missing
//! from the markup are simply absent from the page, so writes to them are
//! no-ops.

pub mod diff;
pub mod page;

pub use diff::{DomPatch, PageDiff};
pub use page::{Display, Node, Page, PageMarkup};
