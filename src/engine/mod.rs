pub mod compositor;
pub mod ease;
pub mod scheduler;
pub mod transitions;
