pub mod lookup_service;
pub use lookup_service::{LookupError, LookupService, lookup_or_fetch};

pub mod lookup_service_impl;
pub use lookup_service_impl::SeaOrmLookupService;

pub mod single_flight;
pub use single_flight::SingleFlight;
