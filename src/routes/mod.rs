pub mod health;
pub mod repairs;
pub mod tracking;
