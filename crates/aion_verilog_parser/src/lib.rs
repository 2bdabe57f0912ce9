//! Hand-rolled recursive descent parser for Verilog-2005.
//!
//! This crate provides a full Verilog-2005 parser with error recovery,
//! producing an AST with source spans for all nodes.

#![warn(missing_docs)]
