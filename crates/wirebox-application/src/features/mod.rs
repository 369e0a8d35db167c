//! Optional container features built on the registry's extension points

pub mod open_generics;
