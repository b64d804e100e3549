pub mod identity_map;
pub mod identity_resolver;
pub mod photo_signature;
pub mod primary_person;
