pub(crate) mod depth;
pub(crate) mod mapper;
