pub(crate) mod links;
pub(crate) mod meter;
pub(crate) mod rhythm;
pub(crate) mod spines;
