pub mod app;
pub mod bridge;
pub mod builders;
pub mod editor;
pub mod error;
pub mod framework;
pub mod manager;
pub mod profile;
pub mod prompt;
pub mod settings;
pub mod sqlite_path;

pub use bridge::{framework_settings, FrameworkSettings};
pub use builders::{build_profile, DriverProbe};
pub use editor::{ProfileEditor, SystemEditor};
pub use error::{Action, OrmError, Result};
pub use framework::{FrameworkRunner, ManageAction};
pub use manager::{list_connections, Context, ProfileManager, Removed};
pub use profile::{ConnectionProfile, Credentials, DatabaseKind};
pub use prompt::{Prompter, ScriptedPrompter};
pub use settings::{MemoryStore, SettingsRecord, SettingsStore, TomlFileStore};
