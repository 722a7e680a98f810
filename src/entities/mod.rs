pub mod diary_entry;
pub mod entry_image;
pub mod session;
pub mod user;
pub mod user_profile;

pub use diary_entry::Entity as DiaryEntry;
pub use entry_image::Entity as EntryImage;
pub use session::Entity as Session;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
