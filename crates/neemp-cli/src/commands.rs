pub mod charges;
pub mod cross;
pub mod info;
pub mod params;
