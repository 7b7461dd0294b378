mod http_mailer;
mod noop_mailer;
mod recording_mailer;

pub use http_mailer::HttpMailer;
pub use noop_mailer::NoopMailer;
pub use recording_mailer::RecordingMailer;
