pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod folders;
pub mod pages;
pub mod users;
