pub mod crypto;
pub mod responses;

pub use responses::ResponseBuilder;
