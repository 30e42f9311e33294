//! Email delivery services.

pub mod sender;
pub mod transport;

pub use sender::EmailSender;
pub use transport::{MailTransport, OutboxTransport, OutgoingEmail, SmtpTransport};
