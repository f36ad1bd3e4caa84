mod dashboard_service;

pub use dashboard_service::{format_file_size, DashboardService};
