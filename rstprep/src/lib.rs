//! rstprep - reStructuredText preprocessor for LaTeX/PDF builds
//!
//! Flattens a tree of `.rst` files into one document, normalizes heading
//! depths, optionally translates the prose from gettext catalogs, replaces
//! placeholders and lowers tables, figures and labels into raw LaTeX.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::cast_possible_truncation)]

pub mod document_config;
pub mod document_model;
pub mod latex_exporter;
pub mod markup;
pub mod pipeline;
pub mod source_tree;
pub mod substitution;
pub mod translation;
