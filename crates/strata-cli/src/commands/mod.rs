pub mod build;
pub mod inline;
pub mod loader;
pub mod slots;
pub mod traces;

#[cfg(test)]
mod fixtures;
