pub mod boom;
pub mod debug;
pub mod ron;
pub mod settings;
pub mod target;

pub use boom::{BoomOperator, BoomOperatorPlugin, BoomRequest};
pub use target::{TargetLookup, TargetRegistry};
