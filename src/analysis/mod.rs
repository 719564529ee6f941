pub mod difference;
pub mod region;
