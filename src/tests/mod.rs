mod analyzer_tests;
mod credits_tests;
mod file_service_tests;
mod models_tests;
mod worker_tests;
