// src/gui/components/mod.rs
pub mod query_bar;
pub mod results_table;
