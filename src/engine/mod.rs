pub(crate) mod bar;
pub(crate) mod cancel;
pub(crate) mod config;
pub(crate) mod frame;
pub(crate) mod race;
pub(crate) mod rank;
