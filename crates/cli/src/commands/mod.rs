pub(crate) mod optimize;
pub(crate) mod serve;
pub(crate) mod token;
