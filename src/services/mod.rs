// src/services/mod.rs

pub mod attendance_service;
pub mod auth;
pub mod conflict;
pub mod leave_service;
pub mod notification_service;
pub mod subscriber_service;
pub mod subscription;

pub use attendance_service::AttendanceService;
pub use auth::AuthService;
pub use leave_service::LeaveService;
pub use notification_service::NotificationService;
pub use subscriber_service::SubscriberService;
