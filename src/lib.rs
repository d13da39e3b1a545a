//! # rfraw
//!
//! A portable, no_std codec for the *rfraw* pulse-timing format: the compact
//! hex text used by rtl_433 and triq.org to carry sub-GHz OOK/FSK pulse trains.
//!
//! An rfraw frame stores a small table of distinct pulse/gap widths followed
//! by a run of nibbles indexing into that table. This crate turns that text
//! back into the ordered list of (pulse, gap) widths in microseconds, and
//! can produce the text from a pulse list.
//!
//! - a tolerant hex lexer that accepts spaces, tabs, hyphens and colons anywhere
//! - a frame decoder for both the `B0` and `B1` frame formats and both body dialects
//! - a driver that decodes `+`- or newline-separated frame sequences
//! - an encoder that clusters widths into bins and writes `B1` or `B0` text
//! - fixed-capacity storage: no heap allocation without the `std` feature
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]` support and replaces `heapless::Vec`s with `std::vec::Vec`s |
//! | `defmt-0-3` | Uses `defmt` logging |
//! | `log`       | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust
//! use rfraw::PulseData;
//!
//! let mut data = PulseData::new();
//! assert!(rfraw::parse(&mut data, "AAB1050068000000F80088001C82839455"));
//! assert_eq!(data.count(), 3);
//! assert_eq!(data.pulses(), &[104, 104, 0]);
//! assert_eq!(data.gaps(), &[248, 136, 28]);
//! assert_eq!(data.sample_rate(), 1_000_000);
//! ```
//!
//! Use [`try_parse`] to find out why decoding stopped, or
//! [`frame::decode_frame`] to inspect a single frame's header and dialect.
//!
//! ## Integration Notes
//!
//! - Decoded widths are microseconds; the sink's sample rate is stamped to 1 MHz once a frame header decodes.
//! - A pulse left without a gap at the end of a frame is not counted.
//! - At most [`consts::MAX_PULSES`] pairs are kept. Longer inputs are truncated, never grown.
//! - `B0` repeat counts are reported but not expanded.
//!
//! --
//! Designed for `#![no_std]` use alongside RF decoder pipelines on small targets.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

pub use heapless;

#[macro_use]
mod fmt;

pub mod consts;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod hex;
pub(crate) mod histogram;
pub mod pulse;

pub use driver::{parse, try_parse};
pub use error::RfrawError;
pub use pulse::PulseData;
