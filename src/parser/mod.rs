pub mod markup;
pub mod record;

pub use record::{LegislatorRecord, Outcome};
