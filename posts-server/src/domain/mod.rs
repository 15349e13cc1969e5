pub(crate) mod calendar;
pub(crate) mod error;
pub(crate) mod post;
