// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! This is a meta module to provide access to the native Rust
//! implementations backing the provider

pub mod oaep;
pub mod rsa;
