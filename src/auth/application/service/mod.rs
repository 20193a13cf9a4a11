pub mod login_service;
