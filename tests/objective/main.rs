mod aggregation;
mod multi_objective;
#[allow(dead_code)]
#[path = "../../benches/test_functions.rs"]
mod test_functions;
