pub mod cache;
pub mod client;
pub mod dashboard_repo;
pub mod inventory_repo;
pub mod operations_repo;
pub mod reporting_repo;
pub mod user_repo;

pub use cache::ResponseCache;
pub use client::{UpstreamClient, UpstreamFile};
pub use dashboard_repo::DashboardRepository;
pub use inventory_repo::InventoryRepository;
pub use operations_repo::OperationsRepository;
pub use reporting_repo::ReportingRepository;
pub use user_repo::UserRepository;
