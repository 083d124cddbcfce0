mod activity_log;
mod course;
mod lesson;
mod notification;
mod progress;
mod question;
mod session;
mod setting;
mod user;

pub use activity_log::*;
pub use course::*;
pub use lesson::*;
pub use notification::*;
pub use progress::*;
pub use question::*;
pub use session::*;
pub use setting::*;
pub use user::*;
