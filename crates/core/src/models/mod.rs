pub mod draft;
pub mod filter;
pub mod price;
pub mod record;
pub mod settings;
pub mod summary;
pub mod transfer;
pub mod validation;
