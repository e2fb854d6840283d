pub(crate) mod event;
pub(crate) mod manual;
pub(crate) mod mount;
