pub mod export;
pub mod formatter;

pub use export::{
    default_export_path, export_filename, to_delimited_text, write_csv_file, DelimitedFormat,
    EXPORT_HEADER,
};
pub use formatter::{
    format_score, format_set, should_use_colors, status_message, truncate_name, Balance, UNNAMED,
};
