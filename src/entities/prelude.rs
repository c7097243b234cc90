pub use super::locations::Entity as Locations;
pub use super::meetups::Entity as Meetups;
pub use super::weathers::Entity as Weathers;
