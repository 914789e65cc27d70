pub mod mock_data_service;
pub mod record_service;
pub mod summary_service;
pub mod transfer_service;
pub mod validation_service;
