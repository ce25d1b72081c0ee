pub(crate) mod controls;
pub(crate) mod entity;
pub(crate) mod events;
pub(crate) mod world;
