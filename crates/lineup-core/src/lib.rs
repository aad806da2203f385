// Library root: formation layouts, the starting XI / bench drag reconciler,
// squad providers and configuration.

pub mod config;
pub mod formation;
pub mod player;
pub mod provider;
pub mod roster;
