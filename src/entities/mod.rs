pub mod prelude;

pub mod locations;
pub mod meetups;
pub mod weathers;
