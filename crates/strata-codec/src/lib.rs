// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! CBOR codec for strata-port scene messages.
//!
//! # Design
//!
//! Serialization is deliberately separated from the port contract, so
//! strata-port stays free of wire concerns. The encoding is a versioned,
//! definite-length CBOR envelope; decoders reject anything they would not
//! produce themselves.

mod cbor;

pub use cbor::*;
