// @generated
// Checked-in buf output for the `aerospike.vector` package.
// The prost file includes the tonic client stubs itself.

#![allow(clippy::derive_partial_eq_without_eq, clippy::large_enum_variant)]

include!("aerospike.vector.rs");
