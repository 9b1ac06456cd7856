pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod leave_repo;
pub use leave_repo::LeaveRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod subscriber_repo;
pub use subscriber_repo::SubscriberRepository;
