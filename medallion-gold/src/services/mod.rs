pub mod calendar;
pub mod dimensions;
pub mod facts;
pub mod loader;
