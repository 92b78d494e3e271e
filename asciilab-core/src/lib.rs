//! asciilab-core: live FIGlet-style text art that never leaves you staring at an error
//!
//! Type some text, pick a typeface, and the preview follows along. Some of the
//! typefaces in the catalog will not load on a given day. This crate keeps
//! the show going: it remembers which ones failed, quietly swaps in
//! `Standard`, tells the user why, and never asks twice.
//!
//! ## How a render travels
//!
//! - [`session::Session`] takes a [`session::Change`] and clamps it into
//!   [`params::RenderParameters`]
//! - [`codec`] mirrors the parameters into a shareable fragment
//! - [`scheduler::RenderScheduler`] waits for the burst of typing to settle
//! - [`resolver::AvailabilityResolver`] probes each typeface at most once
//! - [`fallback::FallbackController`] renders, substituting the default when needed
//! - [`ledger::Ledger`] remembers what worked, plus your favorites
//!
//! [`live::LivePreview`] ties it together on one cooperative task.
//!
//! ## Bring your own collaborators
//!
//! The glyph engine, the network probe and the key-value store sit behind
//! [`engine::RenderEngine`], [`probe::TypefaceProbe`] and
//! [`store::KeyValueStore`]. [`probe::HttpProbe`], [`store::FileStore`] and
//! [`store::MemoryStore`] ship here; the `asciilab` CLI adds an engine that
//! drives the `figlet` binary.
//!
//! ```rust
//! use asciilab_core::codec;
//! use asciilab_core::params::RenderParameters;
//!
//! let params = RenderParameters::default().with_text("HI").with_width(9999);
//! let fragment = codec::encode(&params);
//! assert_eq!(fragment, "t=HI&f=Standard&w=200&aw=0&hl=default&vl=default&fs=12");
//! assert_eq!(codec::decode(&fragment), params);
//! ```
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod catalog;
pub mod codec;
pub mod engine;
pub mod error;
pub mod export;
pub mod fallback;
pub mod ledger;
pub mod live;
pub mod output;
pub mod params;
pub mod probe;
pub mod query;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod store;
