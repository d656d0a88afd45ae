pub mod display;
pub mod prompts;

pub use display::display_books;
pub use prompts::{
    confirm, prompt_credentials, prompt_download_mode, prompt_repage_start, prompt_selection,
    DownloadMode,
};
