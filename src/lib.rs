//! Cascade/parallel formant speech synthesis in the Klatt (1980, 1990)
//! tradition.
//!
//! *NOTE*: This is _not_ a text-to-speech engine. The crate turns
//! time-indexed acoustic parameter frames (fundamental frequency, formant
//! frequencies and bandwidths, source and noise levels) into a monophonic
//! `f64` signal. Everything upstream of the parameters and downstream of
//! the sample buffer is somebody else's job.
//!
//! The engine is a pure pull-based generator: construct a [`Generator`]
//! from [`MainParams`], then fill caller-provided buffers frame by frame
//! with [`Generator::generate_frame`], or render a whole frame sequence at
//! once with [`generate_sound`]. All randomness (noise sources, F0 flutter
//! phase) comes from a caller-supplied [`rand::Rng`], so output is
//! reproducible from a seed.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible (`alloc` is required). Select exactly
//! one math backend: the `std` feature (default) uses the inherent `f64`
//! methods, the `libm` feature uses the `libm` crate.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(clippy::all, rustdoc::all)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

#[cfg(all(feature = "std", feature = "libm"))]
compile_error!("Features \"std\" and \"libm\" are mutually exclusive.");

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("Must specify a math feature: either \"std\" or \"libm\".");

extern crate alloc;

mod error;
mod filter;
mod generator;
mod glottal;
mod math;
mod noise;
mod params;

pub use error::SynthError;
pub use generator::{generate_sound, Generator};
pub use params::{db_to_lin, FrameParams, GlottalSourceKind, MainParams, MAX_ORAL_FORMANTS};
