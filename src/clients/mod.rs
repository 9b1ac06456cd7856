pub mod email;
pub use email::EmailClient;
pub mod github;
pub use github::GithubClient;
pub mod stripe;
pub mod vercel;
pub use vercel::VercelClient;
