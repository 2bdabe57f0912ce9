//! AionIR — the unified intermediate representation for the Aion FPGA toolchain.
//!
//! This crate defines the core IR types including [`Design`], [`Module`], [`Signal`],
//! [`Cell`], and [`Process`] that serve as the lingua franca between all pipeline
//! stages after elaboration.

#![warn(missing_docs)]
