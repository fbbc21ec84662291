pub mod github;

#[cfg(test)]
pub mod mock;
