//! Test modules for the SQL compiler.
