pub mod gazette;
pub mod registry;

pub use gazette::extract;
pub use registry::resolve_name;
