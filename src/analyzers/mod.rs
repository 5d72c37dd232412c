//! Per-frame analyzers of the liveness pipeline.
//!
//! Each module is one independent estimator over the frame or the signal
//! history, returning a plain record; the engine fans out to all of them
//! and [`fusion`] folds the records into the decision.
//!
//! ## Vital signs
//! - [`quality`] - ROI admission gate
//! - [`bvp`] - blood-volume-pulse extraction (GREEN / CHROM / POS)
//! - [`heart_rate`] - Welch-based BPM + spectral quality
//! - [`hrv`] - beat-to-beat variability statistics
//!
//! ## Spoof tells
//! - [`sss`] - subsurface-scattering sharpness ratio
//! - [`moire`] - pixel-grid interference in the 2-D spectrum
//! - [`texture`] - local-std micro-texture uniformity
//! - [`flicker`] - display-refresh energy above the pulse band
//! - [`static_signal`] - temporal variance of the green channel
//! - [`temporal`] - stimulus latency + cross-correlation probes
//! - [`chroma`] - reflected-color match against the stimulus
//!
//! ## Decision
//! - [`fusion`] - weighted scoring, hard gates, diagnostics

pub mod bvp;
pub mod chroma;
pub mod flicker;
pub mod fusion;
pub mod heart_rate;
pub mod hrv;
pub mod moire;
pub mod quality;
pub mod sss;
pub mod static_signal;
pub mod temporal;
pub mod texture;

pub use chroma::ChromaResult;
pub use flicker::FlickerResult;
pub use fusion::{FusionInputs, FusionOutcome};
pub use heart_rate::HeartRateEstimate;
pub use hrv::HrvEstimate;
pub use moire::MoireResult;
pub use quality::{GateOutcome, GrayPlane};
pub use sss::SssResult;
pub use static_signal::StaticSignalResult;
pub use temporal::{LatencyResult, XcorrResult};
pub use texture::TextureResult;
