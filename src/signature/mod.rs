pub mod canonical;
pub mod verify;

#[cfg(test)]
mod tests;

// Re-export main types for easier access
pub use canonical::{attach_signature, canonical_string, sign};
pub use verify::{check_callback, CallbackRejection};
