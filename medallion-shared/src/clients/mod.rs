pub mod db;
pub mod sheets;
