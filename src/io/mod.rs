//! Matrix input: the Matrix Market reader feeding the triplet layout.

pub mod market;
