pub mod fmi;
pub mod meteo;
pub mod simulate;
pub mod weather;
