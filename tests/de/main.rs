#![allow(clippy::cast_precision_loss)]

mod convergence;
mod engine;
#[allow(dead_code)]
#[path = "../../benches/test_functions.rs"]
mod test_functions;
