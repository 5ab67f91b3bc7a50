pub mod charges;
pub mod discard;
pub mod kappa_search;
