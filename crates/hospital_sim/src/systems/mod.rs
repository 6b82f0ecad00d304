pub mod monitor;
pub mod preparation;
pub mod recovery;
pub mod spawner;
pub mod surgery;
