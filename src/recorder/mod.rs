pub(crate) mod constraint;
pub(crate) mod controller;
pub(crate) mod session;
