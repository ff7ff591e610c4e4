pub mod router;
pub mod run;
pub mod state;

pub use run::run;
