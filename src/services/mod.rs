pub mod lookup;
pub mod providers;
pub mod recommendation;
