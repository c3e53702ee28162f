pub mod analysis;
pub mod client;
pub mod config;
pub mod errors;
pub mod llm_client;
pub mod routes;
pub mod search;
pub mod state;

#[cfg(test)]
mod test_support;
