pub mod deserialize_disallow_empty_string;
pub mod record;
