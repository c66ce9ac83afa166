pub mod barline;
pub mod line;
pub mod rational;
pub mod token;
