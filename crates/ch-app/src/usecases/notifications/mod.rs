mod unread_count;

pub use unread_count::GetUnreadNotificationCount;
