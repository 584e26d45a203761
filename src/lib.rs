//! A cached "site counts" dashboard block: published counts per content type
//! and a tag/category shortlist, rendered as an HTML fragment.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
