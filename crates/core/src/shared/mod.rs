pub mod constants;
pub mod photo_record;
pub mod similarity;
