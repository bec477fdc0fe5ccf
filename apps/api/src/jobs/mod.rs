pub mod fallback;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod normalize;
pub mod prompts;
pub mod repository;
pub mod risk;
pub mod service;
pub mod validator;
