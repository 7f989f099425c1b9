//! Classification of decoded responses.

pub mod classify;
