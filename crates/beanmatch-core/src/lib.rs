#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod documents;
pub mod error;
pub mod flavor;
pub mod fuzzy;
pub mod traits;
pub mod types;
pub mod vector;
