pub mod form;
pub mod menu;
pub mod preview;
pub mod session;
pub mod settings;
pub mod store;

pub use form::{collect_snapshot, render_fields, Control, ControlKind, FormSnapshot};
pub use menu::{build_menu, MenuSection};
pub use preview::{PreviewResponse, PreviewTracker};
pub use session::{FormSession, PreviewTicket, SelectionState};
pub use settings::{AppSettings, SettingsError};
pub use store::{FieldStore, SelectionRecord, StoreError};
