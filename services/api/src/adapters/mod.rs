pub mod db;
pub mod workouts;

pub use db::DbAdapter;
