pub mod alert_dialog;
pub mod app;
pub mod call_control_state;
pub mod call_controls;
pub mod call_interface_screen;
pub mod call_status;
pub mod dtmf_pad;
pub mod incoming_call_screen;
pub mod media_panel;
pub mod registration_screen;
pub mod title_banner;
pub mod user_info_bar;

pub use alert_dialog::{AlertDialog, ConfirmDialog};
pub use app::App;
pub use call_controls::CallControls;
pub use call_interface_screen::CallInterfaceScreen;
pub use call_status::CallStatus;
pub use dtmf_pad::DtmfPad;
pub use incoming_call_screen::IncomingCallScreen;
pub use media_panel::MediaPanelView;
pub use registration_screen::RegistrationScreen;
pub use title_banner::TitleBanner;
pub use user_info_bar::UserInfoBar;
