//! Gumroad verify API wire types.

pub mod models;
