pub mod compile;
pub mod context;
pub mod queries;
pub mod report;
pub mod runners;
pub mod state;
pub mod workflow;

#[cfg(test)]
pub mod test_support;
