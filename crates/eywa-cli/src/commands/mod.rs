//! Command handlers, grouped by concern.

pub(crate) mod channels;
pub(crate) mod connections;
pub(crate) mod queries;
pub(crate) mod settings;
pub(crate) mod simulate;
pub(crate) mod stream;
